//! Network provisioning entry point.
//!
//! The firmware exposes provisioning as a single operation: join the stored
//! network, or fall back to the configuration portal. Everything else
//! (association retries, deadlines, AP bring-up) stays inside this module.

use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_time::{Duration, Instant, Timer};
use esp_hal::peripherals::WIFI;
#[cfg(feature = "log")]
use esp_println::println;
use esp_radio::wifi::Config as WifiConfig;
use static_cell::make_static;

use super::{wifi_ap, wifi_sta};
use crate::{config, domain::entity::WifiCredentials};

/// How the device ended up on the network.
pub enum NetMode {
    /// Joined the operator's network with the stored credentials.
    Station(Stack<'static>),
    /// Serving the configuration portal on its own access point.
    Portal(Stack<'static>),
}

/// Join the stored network or start the configuration portal.
///
/// With credentials present, association and address acquisition share one
/// deadline; missing credentials or a missed deadline both land in portal
/// mode. The caller is responsible for enforcing the portal timeout.
pub async fn connect_or_start_portal(
    spawner: Spawner,
    wifi_device: WIFI<'static>,
    credentials: Option<WifiCredentials>,
) -> NetMode {
    let esp_radio_ctrl = &*make_static!(esp_radio::init().unwrap());
    let (mut controller, interfaces) =
        esp_radio::wifi::new(esp_radio_ctrl, wifi_device, WifiConfig::default())
            .unwrap();

    if let Some(credentials) = credentials {
        let deadline = Instant::now()
            + Duration::from_secs(config::PROVISIONING.connect_timeout_secs);

        match wifi_sta::try_associate(&mut controller, &credentials, deadline)
            .await
        {
            Ok(()) => {
                if let Some(stack) = wifi_sta::start_station(
                    spawner,
                    controller,
                    interfaces.sta,
                    deadline,
                )
                .await
                {
                    return NetMode::Station(stack);
                }
                // The controller moved into the reconnect task; without an
                // address the only way forward is a fresh boot.
                #[cfg(feature = "log")]
                println!("wifi: no address before the deadline, restarting");
                Timer::after(Duration::from_millis(
                    config::PROVISIONING.restart_delay_ms,
                ))
                .await;
                esp_hal::system::software_reset()
            }
            Err(()) => {
                #[cfg(feature = "log")]
                println!(
                    "wifi: could not join '{}', starting portal",
                    credentials.ssid.as_str()
                );
                let _ = controller.stop_async().await;
            }
        }
    }

    let stack = wifi_ap::start_portal(spawner, controller, interfaces.ap).await;
    NetMode::Portal(stack)
}
