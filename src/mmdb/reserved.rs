//! Blocks the tree keeps empty unless reserved networks are explicitly allowed.
//!
//! This is a superset of the merge filter's table and is applied by
//! containment, not just by base address.

use crate::models::Network;
use lazy_static::lazy_static;

const TREE_RESERVED_CIDRS: [&str; 22] = [
    "0.0.0.0/8",
    "10.0.0.0/8",
    "100.64.0.0/10",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.0.0.0/24",
    "192.0.2.0/24",
    "192.88.99.0/24",
    "192.168.0.0/16",
    "198.18.0.0/15",
    "198.51.100.0/24",
    "203.0.113.0/24",
    "224.0.0.0/4",
    "240.0.0.0/4",
    "100::/64",
    "2001:db8::/32",
    "fc00::/7",
    "fe80::/10",
    "ff00::/8",
    "::/128",
    "::1/128",
];

lazy_static! {
    pub(super) static ref TREE_RESERVED: Vec<Network> = TREE_RESERVED_CIDRS
        .iter()
        .map(|cidr| Network::parse(cidr).expect("Invalid reserved CIDR"))
        .collect();
}
