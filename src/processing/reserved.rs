//! Reserved (non-routable) address space filter.
//!
//! Classifies a single address against a fixed table of reserved blocks.
//! Networks are filtered by their base address only.

use crate::models::Network;
use lazy_static::lazy_static;
use std::net::IpAddr;

/// Reserved blocks, in table order. Blocks never overlap.
pub const RESERVED_CIDRS: [&str; 17] = [
    "10.0.0.0/8",      // RFC1918 private
    "172.16.0.0/12",   // RFC1918 private
    "192.168.0.0/16",  // RFC1918 private
    "fc00::/7",        // RFC4193 unique local
    "fe80::/10",       // IPv6 link local
    "127.0.0.0/8",     // IPv4 loopback
    "::1/128",         // IPv6 loopback
    "169.254.0.0/16",  // IPv4 link local
    "0.0.0.0/8",       // RFC1122 "this network"
    "::/128",          // IPv6 unspecified
    "100.64.0.0/10",   // RFC6598 shared address space
    "192.0.0.0/24",    // IETF protocol assignments
    "192.0.2.0/24",    // TEST-NET-1
    "198.51.100.0/24", // TEST-NET-2
    "203.0.113.0/24",  // TEST-NET-3
    "224.0.0.0/4",     // IPv4 multicast
    "ff00::/8",        // IPv6 multicast
];

lazy_static! {
    static ref RESERVED_BLOCKS: Vec<Network> = RESERVED_CIDRS
        .iter()
        .map(|cidr| Network::parse(cidr).expect("Invalid reserved CIDR"))
        .collect();
}

/// The reserved block table.
pub fn reserved_blocks() -> &'static [Network] {
    &RESERVED_BLOCKS
}

/// Check whether `addr` falls inside any reserved block.
///
/// IPv4-mapped IPv6 addresses are checked against the IPv4 blocks.
pub fn is_reserved(addr: IpAddr) -> bool {
    let addr = match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(addr),
        IpAddr::V4(_) => addr,
    };
    RESERVED_BLOCKS.iter().any(|block| block.contains(addr))
}

/// Check a network by its base address.
pub fn is_reserved_network(network: &Network) -> bool {
    is_reserved(network.addr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_table_parses() {
        assert_eq!(reserved_blocks().len(), RESERVED_CIDRS.len());
    }

    #[test]
    fn test_block_edges_are_reserved() {
        for block in reserved_blocks() {
            assert!(is_reserved(block.addr()), "base of {block} not reserved");
            let last = match block.addr() {
                IpAddr::V4(base) => {
                    let host_bits = 32 - block.prefix() as u32;
                    let span = if host_bits == 32 { u32::MAX } else { (1u32 << host_bits) - 1 };
                    IpAddr::V4(Ipv4Addr::from(u32::from(base) | span))
                }
                IpAddr::V6(base) => {
                    let host_bits = 128 - block.prefix() as u32;
                    let span = if host_bits == 128 { u128::MAX } else { (1u128 << host_bits) - 1 };
                    IpAddr::V6(Ipv6Addr::from(u128::from(base) | span))
                }
            };
            assert!(is_reserved(last), "last address of {block} not reserved");
        }
    }

    #[test]
    fn test_just_outside_boundaries() {
        let outside = [
            "9.255.255.255",
            "11.0.0.0",
            "172.15.255.255",
            "172.32.0.0",
            "192.167.255.255",
            "192.169.0.0",
            "fbff:ffff:ffff:ffff:ffff:ffff:ffff:ffff",
            "fec0::",
            "126.255.255.255",
            "128.0.0.0",
            "::2",
            "169.253.255.255",
            "169.255.0.0",
            "1.0.0.0",
            "100.63.255.255",
            "100.128.0.0",
            "192.0.1.0",
            "192.0.3.0",
            "198.51.99.255",
            "198.51.101.0",
            "203.0.112.255",
            "203.0.114.0",
            "223.255.255.255",
            "240.0.0.0",
            "feff:ffff:ffff:ffff:ffff:ffff:ffff:ffff",
        ];
        for addr in outside {
            assert!(!is_reserved(ip(addr)), "{addr} should not be reserved");
        }
    }

    #[test]
    fn test_routable_addresses() {
        assert!(!is_reserved(ip("8.8.8.8")));
        assert!(!is_reserved(ip("1.1.1.1")));
        assert!(!is_reserved(ip("2001:4860:4860::8888")));
    }

    #[test]
    fn test_ipv4_mapped_checked_as_ipv4() {
        assert!(is_reserved(ip("::ffff:10.1.2.3")));
        assert!(!is_reserved(ip("::ffff:8.8.8.8")));
    }

    #[test]
    fn test_network_by_base_address() {
        // Base 8.0.0.0 is routable even though the /6 covers 10.0.0.0/8.
        assert!(!is_reserved_network(&Network::parse("8.0.0.0/6").unwrap()));
        assert!(is_reserved_network(&Network::parse("10.1.0.0/16").unwrap()));
    }
}
