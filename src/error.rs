//! Error types for the merge.

use crate::mmdb::{InsertError, TreeError};
use crate::models::Network;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("at least 2 input files are required, got {found}")]
    NotEnoughInputs { found: usize },

    #[error("file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("opening MMDB file {}: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        source: maxminddb::MaxMindDBError,
    },

    #[error("reading networks from {label}: {reason}")]
    SourceRead { label: String, reason: String },

    #[error("inserting network {network} from {label}: {source}")]
    Insert {
        label: String,
        network: Network,
        source: InsertError,
    },

    #[error("creating output database: {0}")]
    Tree(#[from] TreeError),

    #[error("writing database {}: {source}", path.display())]
    Write { path: PathBuf, source: TreeError },

    #[error("verifying output {}: {reason}", path.display())]
    Verify { path: PathBuf, reason: String },

    #[error("rendering report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("initializing logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, MergeError>;
