mod flash_storage;
mod led;
mod random;
pub mod wifi;
pub(crate) mod wifi_ap;
pub(crate) mod wifi_sta;

pub(crate) use flash_storage::{
    Encodable,
    EspNorFlashStorageDriver,
    MAGIC_HEADER_SIZE,
    PersistentStorage,
    StorageError,
};
pub use led::StatusLed;
pub(crate) use random::get_seed;
pub use wifi::{NetMode, connect_or_start_portal};
