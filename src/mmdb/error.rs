use crate::models::Network;
use thiserror::Error;

/// Why the tree refused a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The network lies inside a block the tree keeps empty.
    #[error("{0} is a reserved network")]
    Reserved(Network),

    /// The network lies inside a prefix aliased to the IPv4 subtree.
    #[error("{0} is inside an IPv4 alias")]
    Aliased(Network),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unsupported ip version {0}, only 6 is supported")]
    UnsupportedIpVersion(u16),

    #[error("unsupported record size {0}, expected 24, 28 or 32")]
    UnsupportedRecordSize(u16),

    #[error("record value {record} does not fit in {record_size} bits")]
    Capacity { record: u64, record_size: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
