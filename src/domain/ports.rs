use crate::domain::entity::WifiCredentials;

/// Error type for the persistence operations
#[derive(Debug)]
pub enum PersistenceError {
    DriverError,
}

/// Handler for the logical LED state.
///
/// Implementations must keep the physical pin in lock-step with the
/// boolean: every mutation is immediately followed by the matching pin
/// write (logical "on" drives the pin LOW).
pub trait LedStateHandler {
    /// Set the LED state
    fn set_led(&mut self, on: bool);

    /// Get the current LED state
    fn led_is_on(&self) -> bool;
}

/// Reader interface for the persisted station credentials
pub trait CredentialsReader {
    /// Get the stored credentials, if any record is present
    fn stored_credentials(&self) -> Option<WifiCredentials>;
}

/// Writer interface for the persisted station credentials
pub trait CredentialsWriter {
    /// Persist new credentials
    fn save_credentials(
        &mut self,
        credentials: &WifiCredentials,
    ) -> Result<(), PersistenceError>;

    /// Destroy the stored record
    fn erase_credentials(&mut self) -> Result<(), PersistenceError>;
}

/// Trait for the credentials handler
pub trait CredentialsHandler: CredentialsReader + CredentialsWriter {}

/// Aggregate port exposed to the controllers (HTTP routes and the
/// reset-button task).
pub trait DeviceControlPort: LedStateHandler + CredentialsHandler + Send {}

/// Type alias for the device control port reference
pub type DeviceControlPortRef = &'static mut dyn DeviceControlPort;
