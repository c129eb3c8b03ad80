//! Domain models for the merge.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Network`] - CIDR prefix over either address family
//! - [`IngestStats`], [`MergeStats`], [`VerifiedStats`] - merge bookkeeping
//! - [`source_label`] - provenance label of an input file

mod network;
mod source;
mod stats;

// Re-export public types
pub use network::{
    cut_addr_v4, cut_addr_v6, Family, Network, NetworkError, MAX_LENGTH_V4, MAX_LENGTH_V6,
};
pub use source::{source_label, MMDB_SUFFIX};
pub use stats::{IngestStats, MergeReport, MergeStats, SourceStats, VerifiedStats};
