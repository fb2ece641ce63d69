//! Catch-all DNS responder codec.
//!
//! While the access point is active every name lookup is answered with the
//! device's own address, which forces any client browser onto the portal
//! page. Only the pieces of the protocol needed for that are implemented:
//! parse the question, echo it back, append one A record.

use embassy_net::Ipv4Address;

/// DNS header size in bytes
const HEADER_SIZE: usize = 12;

/// Answer TTL handed to portal clients
const ANSWER_TTL_SECS: u32 = 60;

/// A record, class IN
const QTYPE_A: [u8; 2] = [0, 1];
const QCLASS_IN: [u8; 2] = [0, 1];

/// Compression pointer to the question name at offset 12
const NAME_POINTER: [u8; 2] = [0xC0, 0x0C];

/// Largest packet the responder will handle
pub(crate) const MAX_DNS_PACKET_SIZE: usize = 512;

/// Parsed DNS query
#[derive(Debug)]
pub(crate) struct DnsQuery {
    /// Offset of the first byte past the question section
    pub question_end: usize,
    /// Recursion-desired flag from the request, echoed in the response
    pub recursion_desired: bool,
}

/// Parse a DNS query far enough to answer it
///
/// Returns `None` for responses, packets without a question, and packets
/// whose question section is malformed or truncated.
pub(crate) fn parse_dns_query(packet: &[u8]) -> Option<DnsQuery> {
    if packet.len() < HEADER_SIZE {
        return None;
    }

    // QR bit must be 0 (query) and OPCODE 0 (standard query)
    if packet[2] & 0x80 != 0 || packet[2] & 0x78 != 0 {
        return None;
    }

    // At least one question
    let qdcount = u16::from_be_bytes([packet[4], packet[5]]);
    if qdcount == 0 {
        return None;
    }

    // Walk the labels of the first question name
    let mut i = HEADER_SIZE;
    loop {
        let len = *packet.get(i)? as usize;
        if len == 0 {
            i += 1;
            break;
        }
        // Compression pointers do not occur in queries
        if len & 0xC0 != 0 {
            return None;
        }
        i += 1 + len;
    }

    // QTYPE + QCLASS
    let question_end = i + 4;
    if packet.len() < question_end {
        return None;
    }

    Some(DnsQuery {
        question_end,
        recursion_desired: packet[2] & 0x01 != 0,
    })
}

/// Build a response answering the query with a single A record
///
/// Copies the header and question from the request, then appends an answer
/// pointing at `address`. Returns the length of the response packet.
pub(crate) fn build_dns_response(
    buffer: &mut [u8],
    request: &[u8],
    query: &DnsQuery,
    address: Ipv4Address,
) -> usize {
    // Header and question are echoed back
    buffer[..query.question_end].copy_from_slice(&request[..query.question_end]);

    // QR = 1, AA = 1, RD copied from the request; RA/RCODE = 0
    buffer[2] = 0x84 | u8::from(query.recursion_desired);
    buffer[3] = 0x00;

    // QDCOUNT = 1, ANCOUNT = 1, NSCOUNT = 0, ARCOUNT = 0
    buffer[4..6].copy_from_slice(&1u16.to_be_bytes());
    buffer[6..8].copy_from_slice(&1u16.to_be_bytes());
    buffer[8..12].fill(0);

    // Answer: pointer to the question name, A record with the portal address
    let mut idx = query.question_end;
    buffer[idx..idx + 2].copy_from_slice(&NAME_POINTER);
    idx += 2;
    buffer[idx..idx + 2].copy_from_slice(&QTYPE_A);
    idx += 2;
    buffer[idx..idx + 2].copy_from_slice(&QCLASS_IN);
    idx += 2;
    buffer[idx..idx + 4].copy_from_slice(&ANSWER_TTL_SECS.to_be_bytes());
    idx += 4;
    buffer[idx..idx + 2].copy_from_slice(&4u16.to_be_bytes());
    idx += 2;
    buffer[idx..idx + 4].copy_from_slice(&address.octets());
    idx += 4;

    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTAL_IP: Ipv4Address = Ipv4Address::new(192, 168, 4, 1);

    /// A standard query for `led.local`, RD set
    fn query_packet() -> [u8; 27] {
        let mut packet = [0u8; 27];
        packet[0..2].copy_from_slice(&[0xBE, 0xEF]); // ID
        packet[2] = 0x01; // RD
        packet[4..6].copy_from_slice(&1u16.to_be_bytes()); // QDCOUNT
        packet[12] = 3;
        packet[13..16].copy_from_slice(b"led");
        packet[16] = 5;
        packet[17..22].copy_from_slice(b"local");
        packet[22] = 0;
        packet[23..25].copy_from_slice(&QTYPE_A);
        packet[25..27].copy_from_slice(&QCLASS_IN);
        packet
    }

    #[test]
    fn parses_standard_query() {
        let packet = query_packet();
        let query = parse_dns_query(&packet).unwrap();
        assert_eq!(query.question_end, packet.len());
        assert!(query.recursion_desired);
    }

    #[test]
    fn rejects_responses_and_truncated_packets() {
        let mut response = query_packet();
        response[2] |= 0x80; // QR = response
        assert!(parse_dns_query(&response).is_none());

        let packet = query_packet();
        assert!(parse_dns_query(&packet[..8]).is_none());
        assert!(parse_dns_query(&packet[..packet.len() - 2]).is_none());
    }

    #[test]
    fn rejects_packets_without_questions() {
        let mut packet = query_packet();
        packet[4..6].copy_from_slice(&0u16.to_be_bytes());
        assert!(parse_dns_query(&packet).is_none());
    }

    #[test]
    fn answers_with_portal_address() {
        let packet = query_packet();
        let query = parse_dns_query(&packet).unwrap();

        let mut response = [0u8; MAX_DNS_PACKET_SIZE];
        let len = build_dns_response(&mut response, &packet, &query, PORTAL_IP);

        // ID echoed, response + authoritative + RD flags set
        assert_eq!(&response[0..2], &[0xBE, 0xEF]);
        assert_eq!(response[2], 0x85);
        // One question, one answer
        assert_eq!(&response[4..6], &1u16.to_be_bytes());
        assert_eq!(&response[6..8], &1u16.to_be_bytes());
        // Question section echoed verbatim
        assert_eq!(&response[12..packet.len()], &packet[12..]);
        // Answer carries the portal address
        assert_eq!(&response[len - 4..len], &PORTAL_IP.octets());
        assert_eq!(len, packet.len() + 16);
    }
}
