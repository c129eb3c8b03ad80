//! Merge several MaxMind DB files into one.
//!
//! Every retained network is tagged with the source it came from
//! (`{"from": "<label>"}`), networks inside reserved address space are
//! dropped, and the written file is reopened and recounted.
//!
//! Modules:
//! - [`models`] - Networks and statistics
//! - [`processing`] - Reserved filter, accounting, ingest, merge, verify
//! - [`mmdb`] - Reading and writing MMDB files
//! - [`pipeline`] - A complete run from input paths to a report
//! - [`output`] - Terminal and JSON reporting

pub mod cli;
pub mod error;
pub mod logging;
pub mod mmdb;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod report;

pub use error::{MergeError, Result};
pub use pipeline::{run_merge, validate_inputs, MergeConfig};
pub use report::{LogReporter, Reporter};
