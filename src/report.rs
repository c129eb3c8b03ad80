//! Diagnostics emitted while merging.
//!
//! The merge engine never prints directly; it reports through a [`Reporter`]
//! passed in by the caller. [`LogReporter`] forwards everything to `log`.

use crate::models::{IngestStats, Network, SourceStats, VerifiedStats};
use colored::Colorize;

pub trait Reporter {
    /// A network was dropped as reserved.
    fn skipped(&self, network: &Network, label: &str);

    /// `retained` networks of `label` have been inserted so far.
    fn progress(&self, label: &str, retained: u64);

    /// One source finished ingesting.
    fn source_done(&self, source: &SourceStats);

    /// The recount of the written output disagrees with the running totals.
    fn mismatch(&self, merged: &IngestStats, verified: &VerifiedStats);
}

/// Reporter writing to the `log` facade, colored like the console output.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn skipped(&self, network: &Network, label: &str) {
        log::warn!(
            "{} Skipping reserved network: {} (from {})",
            "WARN:".yellow(),
            network,
            label
        );
    }

    fn progress(&self, label: &str, retained: u64) {
        log::debug!(
            "{} Processed {} networks from {}",
            "DEBUG:".cyan(),
            retained,
            label
        );
    }

    fn source_done(&self, source: &SourceStats) {
        log::info!(
            "{}: {} networks: {} (IPs: {}, skipped: {})",
            "Stats".cyan(),
            source.label,
            source.stats.networks_retained,
            source.stats.addresses_covered,
            source.stats.networks_skipped
        );
    }

    fn mismatch(&self, merged: &IngestStats, verified: &VerifiedStats) {
        log::warn!(
            "{} output holds {} networks ({} IPs) but {} networks ({} IPs) were inserted",
            "WARN:".yellow(),
            verified.networks,
            verified.addresses,
            merged.networks_retained,
            merged.addresses_covered
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Reporter that records calls, for tests.

    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        pub skipped: RefCell<Vec<(Network, String)>>,
        pub progress: RefCell<Vec<(String, u64)>>,
        pub done: RefCell<Vec<SourceStats>>,
        pub mismatches: RefCell<u32>,
    }

    impl Reporter for RecordingReporter {
        fn skipped(&self, network: &Network, label: &str) {
            self.skipped
                .borrow_mut()
                .push((*network, label.to_string()));
        }

        fn progress(&self, label: &str, retained: u64) {
            self.progress
                .borrow_mut()
                .push((label.to_string(), retained));
        }

        fn source_done(&self, source: &SourceStats) {
            self.done.borrow_mut().push(source.clone());
        }

        fn mismatch(&self, _merged: &IngestStats, _verified: &VerifiedStats) {
            *self.mismatches.borrow_mut() += 1;
        }
    }
}
