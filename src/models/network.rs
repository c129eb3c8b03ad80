//! CIDR network type for both address families.
//!
//! Provides [`Network`] for representing a prefix (base address + length),
//! always normalized to its canonical base with host bits zeroed.

use ipnetwork::IpNetwork;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

/// Maximum prefix length for an IPv4 network (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 network (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// Errors raised while building or parsing a [`Network`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("network length /{prefix} is too long, max is /{max}")]
    PrefixTooLong { prefix: u8, max: u8 },

    #[error("invalid address/mask: {0}")]
    InvalidFormat(String),

    #[error("invalid address {0}")]
    InvalidAddress(String),
}

/// Address family of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Number of address bits for the family.
    pub fn bits(&self) -> u8 {
        match self {
            Family::V4 => MAX_LENGTH_V4,
            Family::V6 => MAX_LENGTH_V6,
        }
    }
}

/// Zero the host bits of an IPv4 address.
pub fn cut_addr_v4(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, NetworkError> {
    if len > MAX_LENGTH_V4 {
        return Err(NetworkError::PrefixTooLong {
            prefix: len,
            max: MAX_LENGTH_V4,
        });
    }
    let right_len = MAX_LENGTH_V4 - len;
    let bits = u32::from(addr) as u64;
    let new_bits = (bits >> right_len) << right_len;
    Ok(Ipv4Addr::from(new_bits as u32))
}

/// Zero the host bits of an IPv6 address.
pub fn cut_addr_v6(addr: Ipv6Addr, len: u8) -> Result<Ipv6Addr, NetworkError> {
    if len > MAX_LENGTH_V6 {
        return Err(NetworkError::PrefixTooLong {
            prefix: len,
            max: MAX_LENGTH_V6,
        });
    }
    let bits = u128::from(addr);
    let new_bits = match len {
        0 => 0,
        _ => bits & (u128::MAX << (MAX_LENGTH_V6 - len)),
    };
    Ok(Ipv6Addr::from(new_bits))
}

/// A CIDR prefix over either address family.
///
/// Identity is the `(addr, prefix)` pair. Construction always goes through
/// [`Network::new`] so the base address is canonical, and IPv4-mapped IPv6
/// prefixes (`::ffff:a.b.c.d/96+p`) come out in their IPv4 form.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Network {
    addr: IpAddr,
    prefix: u8,
}

impl Network {
    /// Build a network, zeroing host bits.
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Network, NetworkError> {
        match addr {
            IpAddr::V4(v4) => Ok(Network {
                addr: IpAddr::V4(cut_addr_v4(v4, prefix)?),
                prefix,
            }),
            IpAddr::V6(v6) => {
                if prefix >= 96 {
                    if let Some(v4) = v6.to_ipv4_mapped() {
                        return Network::new(IpAddr::V4(v4), prefix - 96);
                    }
                }
                Ok(Network {
                    addr: IpAddr::V6(cut_addr_v6(v6, prefix)?),
                    prefix,
                })
            }
        }
    }

    /// Parse a network from CIDR notation (e.g. "8.8.8.0/24" or "2001:db8::/32").
    pub fn parse(addr_cidr: &str) -> Result<Network, NetworkError> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidFormat(addr_cidr.to_string()))?;
        let addr: IpAddr = addr
            .parse()
            .map_err(|_| NetworkError::InvalidAddress(addr.to_string()))?;
        let prefix: u8 = mask
            .parse()
            .map_err(|_| NetworkError::InvalidFormat(addr_cidr.to_string()))?;
        Network::new(addr, prefix)
    }

    /// Base (network) address.
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Prefix length.
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn family(&self) -> Family {
        match self.addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// True when `addr` lies inside this network.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.addr, addr) {
            (IpAddr::V4(base), IpAddr::V4(other)) => {
                cut_addr_v4(other, self.prefix).map_or(false, |cut| cut == base)
            }
            (IpAddr::V6(base), IpAddr::V6(other)) => {
                cut_addr_v6(other, self.prefix).map_or(false, |cut| cut == base)
            }
            _ => false,
        }
    }
}

impl FromStr for Network {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::parse(s)
    }
}

impl TryFrom<IpNetwork> for Network {
    type Error = NetworkError;

    fn try_from(net: IpNetwork) -> Result<Self, Self::Error> {
        Network::new(net.ip(), net.prefix())
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Network, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Network::parse(&s).map_err(de::Error::custom)
    }
}
