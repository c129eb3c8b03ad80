//! Trie-backed network database in the MaxMind DB format.
//!
//! This module is the storage collaborator of the merge:
//! - [`SourceDatabase`] - reads an existing MMDB file (via `maxminddb`)
//! - [`Tree`] - builds a new database in memory and serializes it
//! - [`DataValue`] - values stored in the data section

mod data;
mod error;
mod reader;
mod reserved;
mod tree;

pub use data::DataValue;
pub use error::{InsertError, TreeError};
pub use reader::SourceDatabase;
pub use tree::{Tree, TreeOptions, METADATA_MARKER};
