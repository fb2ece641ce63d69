//! Flash storage driver used for the persisted credentials record.
//!
//! Flash is owned by `main`; this driver uses a raw pointer (single-owner
//! assumption) to perform synchronous flash operations.

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};
use esp_storage::FlashStorage;

pub(crate) const BLOCK_SIZE: u32 = 4096;
const MAGIC_HEADER: u16 = 0xBEEF;
pub(crate) const MAGIC_HEADER_SIZE: usize = MAGIC_HEADER.to_le_bytes().len();

#[derive(Debug)]
pub(crate) enum StorageError {
    DriverError,
    InvalidMagicHeader,
    InvalidData,
}

pub(crate) trait Encodable<const SIZE: usize>
where
    Self: Sized,
{
    fn encode(self) -> [u8; SIZE];
    fn decode(data: &[u8]) -> Option<Self>;
}

pub(crate) trait StorageDriver<const STORAGE_SIZE: usize> {
    fn read(&self, buffer: &mut [u8]) -> Result<(), StorageError>;
    fn write(&self, buffer: &[u8]) -> Result<(), StorageError>;
    /// Erase the whole record area, magic header included.
    fn wipe(&self) -> Result<(), StorageError>;
}

/// Persistent storage implementation using a storage driver.
///
/// A record is only considered present while the magic header is intact;
/// `clear` destroys the header, which reads back as "no record".
pub(crate) struct PersistentStorage<
    DRIVER: StorageDriver<STORAGE_SIZE>,
    const STORAGE_SIZE: usize,
> {
    driver: DRIVER,
}

impl<DRIVER: StorageDriver<STORAGE_SIZE>, const STORAGE_SIZE: usize>
    PersistentStorage<DRIVER, STORAGE_SIZE>
{
    pub(crate) fn new(driver: DRIVER) -> Self {
        Self { driver }
    }

    /// Load the persisted record from flash
    pub(crate) fn load<const SIZE: usize, T: Encodable<SIZE>>(
        &self,
    ) -> Result<T, StorageError> {
        let mut buffer = [0u8; STORAGE_SIZE];

        self.driver.read(&mut buffer)?;

        let magic = u16::from_le_bytes([buffer[0], buffer[1]]);
        if magic != MAGIC_HEADER {
            return Err(StorageError::InvalidMagicHeader);
        }
        T::decode(&buffer[MAGIC_HEADER_SIZE..STORAGE_SIZE])
            .ok_or(StorageError::InvalidData)
    }

    /// Save a record to flash
    pub(crate) fn save<const SIZE: usize, T: Encodable<SIZE> + Clone>(
        &self,
        record: &T,
    ) -> Result<(), StorageError> {
        let mut data = [0u8; STORAGE_SIZE];

        data[0..MAGIC_HEADER_SIZE].copy_from_slice(&MAGIC_HEADER.to_le_bytes());
        let encoded = record.clone().encode();
        data[MAGIC_HEADER_SIZE..STORAGE_SIZE].copy_from_slice(&encoded);

        self.driver.write(&data)
    }

    /// Destroy the persisted record
    pub(crate) fn clear(&self) -> Result<(), StorageError> {
        self.driver.wipe()
    }
}

/// Storage driver operating strictly within one flash block at a fixed
/// partition offset.
pub(crate) struct EspNorFlashStorageDriver<const SIZE: usize> {
    flash: *mut FlashStorage<'static>,
    addr: u32,
}

// Safety: the flash pointer is handed out once by `main` and the driver is
// only ever used behind the device-usecases mutex, so no concurrent access
// is possible.
unsafe impl<const SIZE: usize> Send for EspNorFlashStorageDriver<SIZE> {}
unsafe impl<const SIZE: usize> Sync for EspNorFlashStorageDriver<SIZE> {}

impl<const SIZE: usize> EspNorFlashStorageDriver<SIZE> {
    pub(crate) fn new(flash: *mut FlashStorage<'static>, addr: u32) -> Self {
        Self { flash, addr }
    }
}

impl<const SIZE: usize> StorageDriver<SIZE> for EspNorFlashStorageDriver<SIZE> {
    /// Read data from the storage
    fn read(&self, buffer: &mut [u8]) -> Result<(), StorageError> {
        // Safety: single flash owner, see above.
        unsafe { &mut *self.flash }
            .read(self.addr, buffer)
            .map_err(|_| StorageError::DriverError)
    }

    /// Write data to the storage
    fn write(&self, buffer: &[u8]) -> Result<(), StorageError> {
        // Safety: single flash owner, see above.
        let flash = unsafe { &mut *self.flash };
        flash
            .erase(self.addr, self.addr + BLOCK_SIZE)
            .map_err(|_| StorageError::DriverError)?;
        flash
            .write(self.addr, buffer)
            .map_err(|_| StorageError::DriverError)
    }

    /// Erase the record block
    fn wipe(&self) -> Result<(), StorageError> {
        // Safety: single flash owner, see above.
        unsafe { &mut *self.flash }
            .erase(self.addr, self.addr + BLOCK_SIZE)
            .map_err(|_| StorageError::DriverError)
    }
}
