use crate::domain::{
    entity::WifiCredentials,
    ports::{
        CredentialsHandler,
        CredentialsReader,
        CredentialsWriter,
        DeviceControlPort,
        LedStateHandler,
        PersistenceError,
    },
};

/// Device-level operations composed from the LED driver and the credentials
/// repository.
///
/// Constructed once at startup; every component that reads or mutates the
/// LED boolean or the stored credentials goes through this object.
pub struct DeviceUsecases<L: LedStateHandler, C: CredentialsHandler> {
    led: L,
    credentials: C,
}

impl<L: LedStateHandler, C: CredentialsHandler> DeviceUsecases<L, C> {
    pub fn new(led: L, credentials: C) -> Self {
        Self { led, credentials }
    }
}

impl<L: LedStateHandler, C: CredentialsHandler> LedStateHandler
    for DeviceUsecases<L, C>
{
    fn set_led(&mut self, on: bool) {
        self.led.set_led(on);
    }

    fn led_is_on(&self) -> bool {
        self.led.led_is_on()
    }
}

impl<L: LedStateHandler, C: CredentialsHandler> CredentialsReader
    for DeviceUsecases<L, C>
{
    fn stored_credentials(&self) -> Option<WifiCredentials> {
        self.credentials.stored_credentials()
    }
}

impl<L: LedStateHandler, C: CredentialsHandler> CredentialsWriter
    for DeviceUsecases<L, C>
{
    fn save_credentials(
        &mut self,
        credentials: &WifiCredentials,
    ) -> Result<(), PersistenceError> {
        self.credentials.save_credentials(credentials)
    }

    fn erase_credentials(&mut self) -> Result<(), PersistenceError> {
        self.credentials.erase_credentials()
    }
}

impl<L: LedStateHandler, C: CredentialsHandler> CredentialsHandler
    for DeviceUsecases<L, C>
{
}

impl<L: LedStateHandler, C: CredentialsHandler> DeviceControlPort
    for DeviceUsecases<L, C>
{
}

unsafe impl<L: LedStateHandler, C: CredentialsHandler> Send
    for DeviceUsecases<L, C>
{
}
unsafe impl<L: LedStateHandler, C: CredentialsHandler> Sync
    for DeviceUsecases<L, C>
{
}
