//! Read side of the network database, backed by the `maxminddb` crate.

use crate::error::MergeError;
use crate::models::Network;
use crate::processing::{NetworkIter, NetworkSource};
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use maxminddb::Reader;
use serde::de::IgnoredAny;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

/// Networks of the `::/96` subtree of an IPv6 database are IPv4 networks.
fn ipv4_subtree_to_v4(net: IpNetwork) -> (IpAddr, u8) {
    match net {
        IpNetwork::V6(v6) if v6.prefix() >= 96 && u128::from(v6.ip()) >> 32 == 0 => (
            IpAddr::V4(Ipv4Addr::from(u128::from(v6.ip()) as u32)),
            v6.prefix() - 96,
        ),
        other => (other.ip(), other.prefix()),
    }
}

/// An opened MMDB file.
pub struct SourceDatabase {
    path: PathBuf,
    reader: Reader<Vec<u8>>,
}

impl SourceDatabase {
    /// Open and parse the file at `path`.
    pub fn open(path: &Path) -> Result<SourceDatabase, MergeError> {
        let reader = Reader::open_readfile(path).map_err(|source| MergeError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Opened MMDB file: {} (type: {}, ip_version: {}, nodes: {})",
            path.display(),
            reader.metadata.database_type,
            reader.metadata.ip_version,
            reader.metadata.node_count
        );
        Ok(SourceDatabase {
            path: path.to_path_buf(),
            reader,
        })
    }

    pub fn ip_version(&self) -> u16 {
        self.reader.metadata.ip_version
    }

    /// The network covering the whole tree of this database.
    fn root_network(&self) -> Result<IpNetwork, MergeError> {
        let root = match self.ip_version() {
            6 => Ipv6Network::new(Ipv6Addr::UNSPECIFIED, 0).map(IpNetwork::V6),
            _ => Ipv4Network::new(Ipv4Addr::UNSPECIFIED, 0).map(IpNetwork::V4),
        };
        root.map_err(|e| MergeError::SourceRead {
            label: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl NetworkSource for SourceDatabase {
    fn networks(&self) -> Result<NetworkIter<'_>, MergeError> {
        let label = self.path.display().to_string();
        let within = self
            .reader
            .within::<IgnoredAny>(self.root_network()?)
            .map_err(|e| MergeError::SourceRead {
                label: label.clone(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(within.map(move |item| {
            let item = item.map_err(|e| MergeError::SourceRead {
                label: label.clone(),
                reason: e.to_string(),
            })?;
            let (addr, prefix) = ipv4_subtree_to_v4(item.ip_net);
            Network::new(addr, prefix).map_err(|e| MergeError::SourceRead {
                label: label.clone(),
                reason: e.to_string(),
            })
        })))
    }
}
