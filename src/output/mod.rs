//! Output formatting for merge results.
//!
//! This module handles reporting a finished merge:
//! - [`terminal`] - Colored summary lines
//! - [`json`] - Machine readable report

mod json;
mod terminal;

pub use json::report_json;
pub use terminal::{format_stats, print_summary, summary_lines};
