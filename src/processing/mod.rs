//! Merge engine.
//!
//! This module contains the merge policy and bookkeeping:
//! - [`reserved`] - Reserved address space filter
//! - [`accounting`] - Address counting
//! - [`ingest`] - Ingestion of one source
//! - [`merge`] - Ordered merge of all sources
//! - [`verify`] - Recount of the written output

mod accounting;
mod ingest;
mod merge;
mod reserved;
mod verify;

// Re-export public functions
pub use accounting::address_count;
pub use ingest::{ingest, MergeTarget, NetworkIter, NetworkSource, PROGRESS_INTERVAL};
pub use merge::merge;
pub use reserved::{is_reserved, is_reserved_network, reserved_blocks, RESERVED_CIDRS};
pub use verify::{compare, verify};
