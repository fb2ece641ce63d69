use embassy_executor::Spawner;
use embassy_net::{DhcpConfig, Runner, Stack, StackResources};
use embassy_time::{Duration, Instant, Timer, with_timeout};
#[cfg(feature = "log")]
use esp_println::println;
use esp_radio::wifi::{
    AuthMethod,
    ClientConfig,
    ModeConfig,
    WifiController,
    WifiDevice,
    WifiEvent,
    WifiStaState,
};
use heapless::String;
use static_cell::make_static;

use super::random::get_seed;
use crate::{config, domain::entity::WifiCredentials};

/// Maximum length of the hostname
const MAX_HOSTNAME_LEN: usize = 32;

const MAX_NETWORK_CONNECTIONS: usize = 6;

/// Pause between association attempts
const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Associate with the stored network before the deadline passes.
///
/// The controller is left started either way; on failure the caller decides
/// whether to stop it and fall back to the portal.
pub(crate) async fn try_associate(
    controller: &mut WifiController<'static>,
    credentials: &WifiCredentials,
    deadline: Instant,
) -> Result<(), ()> {
    let client_config = if credentials.password.is_empty() {
        ClientConfig::default()
            .with_ssid(credentials.ssid.as_str().into())
            .with_auth_method(AuthMethod::None)
    } else {
        ClientConfig::default()
            .with_ssid(credentials.ssid.as_str().into())
            .with_password(credentials.password.as_str().into())
    };
    let mode_config = ModeConfig::Client(client_config);
    controller.set_config(&mode_config).unwrap();
    controller.start_async().await.unwrap();

    while Instant::now() < deadline {
        #[cfg(feature = "log")]
        println!("wifi_sta: connecting to '{}'", credentials.ssid.as_str());
        match controller.connect_async().await {
            Ok(()) => return Ok(()),
            Err(_e) => {
                #[cfg(feature = "log")]
                println!("wifi_sta: error connecting: {:?}", _e);
                Timer::after(RETRY_DELAY).await;
            }
        }
    }
    Err(())
}

/// Bring up the station network stack after a successful association.
///
/// Spawns the reconnect and runner tasks, then waits for a DHCP address
/// until the deadline. `None` means the address never arrived.
pub(crate) async fn start_station(
    spawner: Spawner,
    controller: WifiController<'static>,
    sta_device: WifiDevice<'static>,
    deadline: Instant,
) -> Option<Stack<'static>> {
    let mut dhcp_config = DhcpConfig::default();
    let hostname = String::<MAX_HOSTNAME_LEN>::try_from(config::DEVICE.hostname)
        .expect("Invalid hostname");
    dhcp_config.hostname = Some(hostname);

    let net_config = embassy_net::Config::dhcpv4(dhcp_config);

    let network_resources =
        make_static!(StackResources::<{ MAX_NETWORK_CONNECTIONS }>::new());
    let (stack, runner) =
        embassy_net::new(sta_device, net_config, network_resources, get_seed());

    spawner.spawn(sta_reconnect_task(controller)).ok();
    spawner.spawn(sta_network_runner_task(runner)).ok();

    let timeout = deadline.saturating_duration_since(Instant::now());
    with_timeout(timeout, wait_for_connection(stack)).await.ok()?;

    Some(stack)
}

/// Background task keeping the station associated
///
/// The initial association is done by `try_associate`; from here on the
/// task only waits for drops and reconnects.
#[embassy_executor::task]
async fn sta_reconnect_task(mut controller: WifiController<'static>) {
    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            Timer::after(Duration::from_millis(2000)).await;
        }

        #[cfg(feature = "log")]
        println!("wifi_sta: reconnecting");
        if let Err(_e) = controller.connect_async().await {
            #[cfg(feature = "log")]
            println!("wifi_sta: error reconnecting: {:?}", _e);
            Timer::after(Duration::from_millis(5000)).await;
        }
    }
}

/// Background task for running the network stack
#[embassy_executor::task]
async fn sta_network_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

/// Wait for full network connectivity (link + IP address)
async fn wait_for_connection(stack: Stack<'_>) {
    // Wait for the network link to become active
    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }

    // Wait for the network stack to obtain an IPv4 address via DHCP
    loop {
        if let Some(_config) = stack.config_v4() {
            #[cfg(feature = "log")]
            println!("wifi_sta: got address {}", _config.address);
            return;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
}
