use embassy_executor::Spawner;
use embassy_net::{
    Ipv4Address,
    Ipv4Cidr,
    Runner,
    Stack,
    StackResources,
    StaticConfigV4,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Duration, Timer};
#[cfg(feature = "log")]
use esp_println::println;
use esp_radio::wifi::{
    AccessPointConfig,
    AuthMethod,
    ModeConfig,
    WifiController,
    WifiDevice,
};
use static_cell::make_static;

use super::random::get_seed;
use crate::{
    config,
    net::dhcp::{
        DhcpMessageType,
        allocate_ip,
        build_dhcp_response,
        parse_dhcp_request,
    },
    net::dns::{MAX_DNS_PACKET_SIZE, build_dns_response, parse_dns_query},
};

/// DHCP server and client ports
const DHCP_SERVER_PORT: u16 = 67;
const DHCP_CLIENT_PORT: u16 = 68;

/// DNS server port
const DNS_SERVER_PORT: u16 = 53;

const MAX_CONNECTIONS: usize = 6;

/// Portal address (192.168.4.1/24)
const AP_IP_ADDRESS: Ipv4Address = Ipv4Address::new(192, 168, 4, 1);
const AP_PREFIX_LEN: u8 = 24;

/// Start the configuration portal network.
///
/// Brings up the access point with a static address, then spawns the DHCP
/// server and the catch-all DNS responder that make the portal "captive".
pub(crate) async fn start_portal(
    spawner: Spawner,
    controller: WifiController<'static>,
    ap_device: WifiDevice<'static>,
) -> Stack<'static> {
    let static_config = StaticConfigV4 {
        address: Ipv4Cidr::new(AP_IP_ADDRESS, AP_PREFIX_LEN),
        gateway: Some(AP_IP_ADDRESS),
        dns_servers: heapless::Vec::default(),
    };
    let net_config = embassy_net::Config::ipv4_static(static_config);

    let network_resources = make_static!(StackResources::<MAX_CONNECTIONS>::new());
    let (stack, runner) =
        embassy_net::new(ap_device, net_config, network_resources, get_seed());

    spawner.spawn(portal_wifi_ap_task(controller)).ok();
    spawner.spawn(portal_network_runner_task(runner)).ok();

    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
    // Give some extra time
    Timer::after(Duration::from_millis(100)).await;

    spawner.spawn(dhcp_server_task(stack, AP_IP_ADDRESS)).ok();
    spawner.spawn(dns_server_task(stack, AP_IP_ADDRESS)).ok();

    stack
}

/// Background task for running the Wi-Fi AP
#[embassy_executor::task]
async fn portal_wifi_ap_task(mut controller: WifiController<'static>) {
    #[cfg(feature = "log")]
    println!(
        "portal_wifi: starting AP with SSID '{}'",
        config::PORTAL.ssid
    );

    let ap_config = AccessPointConfig::default()
        .with_ssid(config::PORTAL.ssid.into())
        .with_auth_method(AuthMethod::Wpa2Personal)
        .with_password(config::PORTAL.password.into());

    let mode_config = ModeConfig::AccessPoint(ap_config);
    controller.set_config(&mode_config).unwrap();
    controller.start_async().await.unwrap();

    #[cfg(feature = "log")]
    println!("portal_wifi: AP started");

    // Keep the AP running
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

/// Background task for running the network stack
#[embassy_executor::task]
async fn portal_network_runner_task(
    mut runner: Runner<'static, WifiDevice<'static>>,
) {
    runner.run().await;
}

/// DHCP server task
///
/// Listens for DHCP discover/request messages and responds with offers/acks.
/// Uses a stateless allocation strategy based on client MAC address.
#[embassy_executor::task]
async fn dhcp_server_task(stack: Stack<'static>, ap_ip_address: Ipv4Address) {
    #[cfg(feature = "log")]
    println!("dhcp_server: starting on port {}", DHCP_SERVER_PORT);

    let mut rx_meta = [PacketMetadata::EMPTY; 8];
    let mut rx_buffer = [0u8; 1024];
    let mut tx_meta = [PacketMetadata::EMPTY; 8];
    let mut tx_buffer = [0u8; 1024];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );

    if let Err(_e) = socket.bind(DHCP_SERVER_PORT) {
        #[cfg(feature = "log")]
        println!(
            "dhcp_server: failed to bind port {}: {:?}",
            DHCP_SERVER_PORT, _e
        );
        return;
    }

    let mut packet = [0u8; 576];

    loop {
        match socket.recv_from(&mut packet).await {
            Ok((len, _remote)) => {
                // Parse the DHCP request
                let Some(request) = parse_dhcp_request(&packet[..len]) else {
                    continue;
                };

                let offered_ip = allocate_ip(&request.client_mac);

                let response_type = match request.message_type {
                    DhcpMessageType::Discover => DhcpMessageType::Offer,
                    DhcpMessageType::Request => DhcpMessageType::Ack,
                    _ => {
                        #[cfg(feature = "log")]
                        println!(
                            "dhcp_server: unexpected message type {:?}, ignoring",
                            request.message_type
                        );
                        continue;
                    }
                };

                // Build response
                let response_len = build_dhcp_response(
                    ap_ip_address,
                    &mut packet,
                    &request,
                    offered_ip,
                    response_type,
                );

                // Send to broadcast on client port
                let dest = (Ipv4Address::BROADCAST, DHCP_CLIENT_PORT);
                if let Err(_e) = socket.send_to(&packet[..response_len], dest).await
                {
                    #[cfg(feature = "log")]
                    println!("dhcp_server: send error: {:?}", _e);
                }
            }
            Err(_e) => {
                #[cfg(feature = "log")]
                println!("dhcp_server: recv error: {:?}", _e);
            }
        }
    }
}

/// Catch-all DNS responder task
///
/// Answers every name lookup with the portal address so that any client
/// browser lands on the configuration page.
#[embassy_executor::task]
async fn dns_server_task(stack: Stack<'static>, ap_ip_address: Ipv4Address) {
    #[cfg(feature = "log")]
    println!("dns_server: starting on port {}", DNS_SERVER_PORT);

    let mut rx_meta = [PacketMetadata::EMPTY; 8];
    let mut rx_buffer = [0u8; 1024];
    let mut tx_meta = [PacketMetadata::EMPTY; 8];
    let mut tx_buffer = [0u8; 1024];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );

    if let Err(_e) = socket.bind(DNS_SERVER_PORT) {
        #[cfg(feature = "log")]
        println!(
            "dns_server: failed to bind port {}: {:?}",
            DNS_SERVER_PORT, _e
        );
        return;
    }

    let mut packet = [0u8; MAX_DNS_PACKET_SIZE];
    let mut response = [0u8; MAX_DNS_PACKET_SIZE + 16];

    loop {
        match socket.recv_from(&mut packet).await {
            Ok((len, remote)) => {
                let Some(query) = parse_dns_query(&packet[..len]) else {
                    continue;
                };

                let response_len = build_dns_response(
                    &mut response,
                    &packet[..len],
                    &query,
                    ap_ip_address,
                );

                if let Err(_e) =
                    socket.send_to(&response[..response_len], remote).await
                {
                    #[cfg(feature = "log")]
                    println!("dns_server: send error: {:?}", _e);
                }
            }
            Err(_e) => {
                #[cfg(feature = "log")]
                println!("dns_server: recv error: {:?}", _e);
            }
        }
    }
}
