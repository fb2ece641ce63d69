use heapless::String;

/// Station credentials for the operator's network.
///
/// Owned by the credentials repository while persisted; the rest of the
/// firmware only ever triggers "save" and "erase" and treats the stored
/// layout as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String<32>,
    pub password: String<64>,
}
