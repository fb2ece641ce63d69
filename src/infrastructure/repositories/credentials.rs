use core::str::FromStr;

use bytemuck::{Pod, Zeroable};
use esp_storage::FlashStorage;
use heapless::String;

use crate::config::CREDENTIALS_PARTITION_OFFSET;
use crate::domain::entity::WifiCredentials;
use crate::domain::ports::{
    CredentialsHandler,
    CredentialsReader,
    CredentialsWriter,
    PersistenceError,
};
use crate::infrastructure::drivers::{
    Encodable,
    EspNorFlashStorageDriver,
    MAGIC_HEADER_SIZE,
    PersistentStorage,
    StorageError,
};

const SSID_LEN: usize = 32;
const PASSWORD_LEN: usize = 64;
const RECORD_SIZE: usize = SSID_LEN + PASSWORD_LEN;
const STORAGE_SIZE: usize = MAGIC_HEADER_SIZE + RECORD_SIZE;

/// Fixed-layout flash record for the station credentials.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
struct PersistentCredentials {
    ssid: [u8; SSID_LEN],
    password: [u8; PASSWORD_LEN],
}

impl From<&WifiCredentials> for PersistentCredentials {
    fn from(credentials: &WifiCredentials) -> Self {
        Self {
            ssid: string_to_array(&credentials.ssid),
            password: string_to_array(&credentials.password),
        }
    }
}

impl PersistentCredentials {
    fn to_entity(self) -> Option<WifiCredentials> {
        Some(WifiCredentials {
            ssid: parse_padded_string(&self.ssid)?,
            password: parse_padded_string(&self.password)?,
        })
    }
}

impl Encodable<RECORD_SIZE> for PersistentCredentials {
    fn encode(self) -> [u8; RECORD_SIZE] {
        let mut data = [0u8; RECORD_SIZE];
        data.copy_from_slice(bytemuck::bytes_of(&self));
        data
    }

    fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != RECORD_SIZE {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(data))
    }
}

/// Credentials repository backed by the credentials flash partition.
///
/// Absence of a valid record (fresh device, erased record, corrupted data)
/// simply reads back as "no credentials stored".
pub struct CredentialsRepository {
    storage: PersistentStorage<EspNorFlashStorageDriver<STORAGE_SIZE>, STORAGE_SIZE>,
}

impl CredentialsRepository {
    pub fn new(flash: *mut FlashStorage<'static>) -> Self {
        let driver =
            EspNorFlashStorageDriver::new(flash, CREDENTIALS_PARTITION_OFFSET);
        Self {
            storage: PersistentStorage::new(driver),
        }
    }
}

impl CredentialsReader for CredentialsRepository {
    fn stored_credentials(&self) -> Option<WifiCredentials> {
        let record: PersistentCredentials = self.storage.load().ok()?;
        let credentials = record.to_entity()?;
        if credentials.ssid.is_empty() {
            return None;
        }
        Some(credentials)
    }
}

impl CredentialsWriter for CredentialsRepository {
    fn save_credentials(
        &mut self,
        credentials: &WifiCredentials,
    ) -> Result<(), PersistenceError> {
        let record = PersistentCredentials::from(credentials);
        self.storage
            .save(&record)
            .map_err(|_: StorageError| PersistenceError::DriverError)
    }

    fn erase_credentials(&mut self) -> Result<(), PersistenceError> {
        self.storage
            .clear()
            .map_err(|_: StorageError| PersistenceError::DriverError)
    }
}

impl CredentialsHandler for CredentialsRepository {}

/// Read a NUL-padded string back out of a fixed-size byte array
fn parse_padded_string<const N: usize>(bytes: &[u8]) -> Option<String<N>> {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let s = core::str::from_utf8(&bytes[..len]).ok()?;

    String::from_str(s).ok()
}

/// Convert a heapless::String to a fixed-size byte array, padding with zeros
fn string_to_array<const N: usize>(s: &String<N>) -> [u8; N] {
    let mut arr = [0u8; N];
    let bytes = s.as_bytes();
    let len = bytes.len().min(N);
    arr[..len].copy_from_slice(&bytes[..len]);
    arr
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(ssid: &str, password: &str) -> WifiCredentials {
        WifiCredentials {
            ssid: String::from_str(ssid).unwrap(),
            password: String::from_str(password).unwrap(),
        }
    }

    #[test]
    fn record_roundtrip_preserves_credentials() {
        let original = credentials("homenet", "hunter2hunter2");
        let record = PersistentCredentials::from(&original);
        let decoded =
            PersistentCredentials::decode(&record.encode()).unwrap();
        assert_eq!(decoded.to_entity().unwrap(), original);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(PersistentCredentials::decode(&[0u8; 7]).is_none());
    }

    #[test]
    fn padded_string_roundtrip() {
        let s: String<32> = String::from_str("short").unwrap();
        let arr = string_to_array(&s);
        assert_eq!(parse_padded_string::<32>(&arr).unwrap(), s);
    }

    #[test]
    fn padded_string_rejects_invalid_utf8() {
        let arr = [0xFFu8; 8];
        assert!(parse_padded_string::<8>(&arr).is_none());
    }
}
