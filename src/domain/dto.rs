use heapless::String;
use serde::{Deserialize, Serialize};

/// Credentials submitted through the provisioning API.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsDto {
    pub ssid: String<32>,
    pub password: String<64>,
}

/// Snapshot reported by `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub led: bool,
    pub portal: bool,
    pub version: String<32>,
}
