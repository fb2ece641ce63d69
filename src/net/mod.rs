//! Protocol plumbing for the captive portal: a small HTTP/1.1 layer plus
//! the DHCP and DNS codecs used while the access point is active.

pub(crate) mod dhcp;
pub(crate) mod dns;
pub(crate) mod http;
