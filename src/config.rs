pub struct DeviceConfig {
    pub name: &'static str,
    pub hostname: &'static str,
}

/// Access point served while the device is unprovisioned.
pub struct PortalConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

/// Timings for the credential-reset input.
pub struct ResetButtonConfig {
    /// Sustained HIGH time that counts as a deliberate reset request.
    pub hold_ms: u64,
    /// Window after power-up during which the input is polled before
    /// provisioning starts.
    pub boot_window_ms: u64,
    pub poll_interval_ms: u64,
    /// Settle time between erasing credentials and restarting.
    pub settle_ms: u64,
}

pub struct ProvisioningConfig {
    /// Deadline for joining the stored network before falling back to the
    /// portal.
    pub connect_timeout_secs: u64,
    /// How long the portal waits for credentials before giving up.
    pub portal_timeout_secs: u64,
    /// Delay between reporting a provisioning failure and restarting.
    pub restart_delay_ms: u64,
}

pub const DEVICE: DeviceConfig = DeviceConfig {
    name: "ESP32 LED Control",
    hostname: "esp32-led-control",
};

pub const PORTAL: PortalConfig = PortalConfig {
    ssid: "ESP32-LED-Control",
    password: "12345678",
};

pub const RESET_BUTTON: ResetButtonConfig = ResetButtonConfig {
    hold_ms: 8000,
    boot_window_ms: 8000,
    poll_interval_ms: 100,
    settle_ms: 500,
};

pub const PROVISIONING: ProvisioningConfig = ProvisioningConfig {
    connect_timeout_secs: 30,
    portal_timeout_secs: 180,
    restart_delay_ms: 3000,
};

/// Delay that lets an in-flight HTTP response reach the client before the
/// device erases state or restarts.
pub(crate) const RESPONSE_FLUSH_MS: u64 = 1000;

/// Base address of the `credentials` partition (defined in partitions.csv).
pub(crate) const CREDENTIALS_PARTITION_OFFSET: u32 = 0x31_0000;

pub(crate) const BUILD_VERSION: &str = env!("BUILD_VERSION");

#[macro_export]
macro_rules! led_gpio {
    ($p:expr) => {
        $p.GPIO2
    };
}

#[macro_export]
macro_rules! reset_button_gpio {
    ($p:expr) => {
        $p.GPIO14
    };
}
