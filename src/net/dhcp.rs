//! DHCP message parsing and response building for the stateless portal
//! server.

use embassy_net::Ipv4Address;

/// DHCP message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DhcpMessageType {
    Discover,
    Offer,
    Request,
    Ack,
}

impl DhcpMessageType {
    pub(crate) const fn as_u8(self) -> u8 {
        match self {
            DhcpMessageType::Discover => 1,
            DhcpMessageType::Offer => 2,
            DhcpMessageType::Request => 3,
            DhcpMessageType::Ack => 5,
        }
    }

    pub(crate) const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(DhcpMessageType::Discover),
            2 => Some(DhcpMessageType::Offer),
            3 => Some(DhcpMessageType::Request),
            5 => Some(DhcpMessageType::Ack),
            _ => None,
        }
    }
}

/// DHCP options
const DHCP_OPTION_MESSAGE_TYPE: u8 = 53;
const DHCP_OPTION_SERVER_ID: u8 = 54;
const DHCP_OPTION_LEASE_TIME: u8 = 51;
const DHCP_OPTION_SUBNET_MASK: u8 = 1;
const DHCP_OPTION_ROUTER: u8 = 3;
const DHCP_OPTION_DNS: u8 = 6;
const DHCP_OPTION_END: u8 = 255;

/// DHCP magic cookie
const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

/// Lease configuration
const LEASE_TIME_SECS: u32 = 3600; // 1 hour
const SUBNET_MASK: Ipv4Address = Ipv4Address::new(255, 255, 255, 0);

/// Minimum DHCP packet size (BOOTP header + magic cookie)
const MIN_DHCP_PACKET_SIZE: usize = 240;

/// Parsed DHCP request
#[derive(Debug)]
pub(crate) struct DhcpRequest {
    /// Transaction ID
    pub xid: [u8; 4],
    /// Client MAC address
    pub client_mac: [u8; 6],
    /// Message type (DISCOVER, REQUEST, etc.)
    pub message_type: DhcpMessageType,
}

/// Parse a DHCP request from a raw packet
///
/// Returns `None` if the packet is invalid or not a BOOTREQUEST
pub(crate) fn parse_dhcp_request(packet: &[u8]) -> Option<DhcpRequest> {
    if packet.len() < MIN_DHCP_PACKET_SIZE {
        return None;
    }

    // Check op code (must be BOOTREQUEST = 1)
    if packet[0] != 1 {
        return None;
    }

    // Get transaction ID
    let mut xid = [0u8; 4];
    xid.copy_from_slice(&packet[4..8]);

    // Get client MAC address
    let mut client_mac = [0u8; 6];
    client_mac.copy_from_slice(&packet[28..34]);

    // Check magic cookie
    if packet[236..240] != DHCP_MAGIC_COOKIE {
        return None;
    }

    // Find message type in options
    let options = &packet[240..];
    let message_type = find_dhcp_option(options, DHCP_OPTION_MESSAGE_TYPE)
        .and_then(|data| data.first().copied())
        .and_then(DhcpMessageType::from_u8)?;

    Some(DhcpRequest {
        xid,
        client_mac,
        message_type,
    })
}

/// Allocate an IP address for a client based on their MAC address
///
/// Uses a simple stateless algorithm to derive a consistent IP from the MAC.
/// Returns an address in the range 192.168.4.2 - 192.168.4.50
pub(crate) fn allocate_ip(mac: &[u8; 6]) -> Ipv4Address {
    let offset = (mac[5] % 49) + 2;
    Ipv4Address::new(192, 168, 4, offset)
}

/// Build a DHCP response (OFFER or ACK)
///
/// The portal advertises itself as router and DNS server so that every
/// client name lookup lands on the device.
///
/// Returns the length of the response packet
pub(crate) fn build_dhcp_response(
    ap_ip_address: Ipv4Address,
    buffer: &mut [u8],
    request: &DhcpRequest,
    offered_ip: Ipv4Address,
    response_type: DhcpMessageType,
) -> usize {
    buffer.fill(0);

    // BOOTP header
    buffer[0] = 2; // op: BOOTREPLY
    buffer[1] = 1; // htype: Ethernet
    buffer[2] = 6; // hlen: MAC length
    buffer[3] = 0; // hops

    // Transaction ID
    buffer[4..8].copy_from_slice(&request.xid);

    // secs, flags
    buffer[8..10].copy_from_slice(&[0, 0]);
    buffer[10..12].copy_from_slice(&[0x80, 0x00]); // Broadcast flag

    // ciaddr (client IP) - 0
    // yiaddr (your IP) - offered IP
    buffer[16..20].copy_from_slice(&offered_ip.octets());

    // siaddr (server IP)
    buffer[20..24].copy_from_slice(&ap_ip_address.octets());

    // giaddr (gateway IP) - 0

    // chaddr (client hardware address)
    buffer[28..34].copy_from_slice(&request.client_mac);

    // sname, file - leave as 0

    // DHCP magic cookie at offset 236
    buffer[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);

    // DHCP options start at 240
    let mut opt_idx = 240;

    // Message type
    buffer[opt_idx] = DHCP_OPTION_MESSAGE_TYPE;
    buffer[opt_idx + 1] = 1;
    buffer[opt_idx + 2] = response_type.as_u8();
    opt_idx += 3;

    // Server identifier
    buffer[opt_idx] = DHCP_OPTION_SERVER_ID;
    buffer[opt_idx + 1] = 4;
    buffer[opt_idx + 2..opt_idx + 6].copy_from_slice(&ap_ip_address.octets());
    opt_idx += 6;

    // Lease time
    buffer[opt_idx] = DHCP_OPTION_LEASE_TIME;
    buffer[opt_idx + 1] = 4;
    buffer[opt_idx + 2..opt_idx + 6].copy_from_slice(&LEASE_TIME_SECS.to_be_bytes());
    opt_idx += 6;

    // Subnet mask
    buffer[opt_idx] = DHCP_OPTION_SUBNET_MASK;
    buffer[opt_idx + 1] = 4;
    buffer[opt_idx + 2..opt_idx + 6].copy_from_slice(&SUBNET_MASK.octets());
    opt_idx += 6;

    // Router (gateway)
    buffer[opt_idx] = DHCP_OPTION_ROUTER;
    buffer[opt_idx + 1] = 4;
    buffer[opt_idx + 2..opt_idx + 6].copy_from_slice(&ap_ip_address.octets());
    opt_idx += 6;

    // DNS server (the device itself, captive portal precondition)
    buffer[opt_idx] = DHCP_OPTION_DNS;
    buffer[opt_idx + 1] = 4;
    buffer[opt_idx + 2..opt_idx + 6].copy_from_slice(&ap_ip_address.octets());
    opt_idx += 6;

    // End option
    buffer[opt_idx] = DHCP_OPTION_END;
    opt_idx += 1;

    opt_idx
}

/// Find a DHCP option in the options section
///
/// The options slice should start AFTER the magic cookie (at offset 240 in
/// the packet)
fn find_dhcp_option(options: &[u8], option_code: u8) -> Option<&[u8]> {
    let mut i = 0;

    while i < options.len() {
        let code = options[i];
        if code == DHCP_OPTION_END {
            break;
        }
        if code == 0 {
            // Padding
            i += 1;
            continue;
        }
        if i + 1 >= options.len() {
            break;
        }
        let len = options[i + 1] as usize;
        if i + 2 + len > options.len() {
            break;
        }
        if code == option_code {
            return Some(&options[i + 2..i + 2 + len]);
        }
        i += 2 + len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const AP_IP: Ipv4Address = Ipv4Address::new(192, 168, 4, 1);
    const CLIENT_MAC: [u8; 6] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x07];

    fn request_packet(message_type: u8) -> [u8; 300] {
        let mut packet = [0u8; 300];
        packet[0] = 1; // BOOTREQUEST
        packet[4..8].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
        packet[28..34].copy_from_slice(&CLIENT_MAC);
        packet[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);
        packet[240] = DHCP_OPTION_MESSAGE_TYPE;
        packet[241] = 1;
        packet[242] = message_type;
        packet[243] = DHCP_OPTION_END;
        packet
    }

    #[test]
    fn parses_discover() {
        let packet = request_packet(DhcpMessageType::Discover.as_u8());
        let request = parse_dhcp_request(&packet).unwrap();
        assert_eq!(request.message_type, DhcpMessageType::Discover);
        assert_eq!(request.xid, [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(request.client_mac, CLIENT_MAC);
    }

    #[test]
    fn rejects_truncated_and_reply_packets() {
        assert!(parse_dhcp_request(&[0u8; 64]).is_none());

        let mut reply = request_packet(DhcpMessageType::Discover.as_u8());
        reply[0] = 2; // BOOTREPLY
        assert!(parse_dhcp_request(&reply).is_none());
    }

    #[test]
    fn allocated_ip_is_stable_and_in_range() {
        let ip = allocate_ip(&CLIENT_MAC);
        assert_eq!(ip, allocate_ip(&CLIENT_MAC));
        let host = ip.octets()[3];
        assert!((2..=50).contains(&host));
    }

    #[test]
    fn response_advertises_portal_as_router_and_dns() {
        let packet = request_packet(DhcpMessageType::Request.as_u8());
        let request = parse_dhcp_request(&packet).unwrap();
        let offered = allocate_ip(&request.client_mac);

        let mut response = [0u8; 576];
        let len = build_dhcp_response(
            AP_IP,
            &mut response,
            &request,
            offered,
            DhcpMessageType::Ack,
        );

        assert_eq!(response[0], 2); // BOOTREPLY
        assert_eq!(&response[4..8], &request.xid);
        assert_eq!(&response[16..20], &offered.octets());
        let options = &response[240..len];
        assert_eq!(
            find_dhcp_option(options, DHCP_OPTION_MESSAGE_TYPE),
            Some(&[DhcpMessageType::Ack.as_u8()][..])
        );
        assert_eq!(
            find_dhcp_option(options, DHCP_OPTION_ROUTER),
            Some(&AP_IP.octets()[..])
        );
        assert_eq!(
            find_dhcp_option(options, DHCP_OPTION_DNS),
            Some(&AP_IP.octets()[..])
        );
    }
}
