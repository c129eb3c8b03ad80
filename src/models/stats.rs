//! Merge statistics.

use super::Network;
use crate::processing::address_count;
use serde::Serialize;
use std::path::PathBuf;

/// Running counters for one ingestion, or totals across several.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Networks inserted into the merged database.
    pub networks_retained: u64,
    /// Networks dropped as reserved, by the filter or by the target.
    pub networks_skipped: u64,
    /// Addresses covered by retained networks (blocks of 2^64 or more count as 0).
    /// Sums wrap at 2^64.
    pub addresses_covered: u64,
}

impl IngestStats {
    pub fn record_retained(&mut self, network: &Network) {
        self.networks_retained += 1;
        self.addresses_covered = self
            .addresses_covered
            .wrapping_add(address_count(network.prefix(), network.family()));
    }

    pub fn record_skipped(&mut self) {
        self.networks_skipped += 1;
    }

    /// Add another set of counters into this one.
    pub fn absorb(&mut self, other: &IngestStats) {
        self.networks_retained += other.networks_retained;
        self.networks_skipped += other.networks_skipped;
        self.addresses_covered = self.addresses_covered.wrapping_add(other.addresses_covered);
    }

    /// Every network the source iteration produced.
    pub fn networks_seen(&self) -> u64 {
        self.networks_retained + self.networks_skipped
    }
}

/// Statistics of a single source, labelled with its provenance tag.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub label: String,
    pub stats: IngestStats,
}

/// Result of a whole merge run, per source in merge order plus totals.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub sources: Vec<SourceStats>,
    pub totals: IngestStats,
}

impl MergeStats {
    pub fn push(&mut self, source: SourceStats) {
        self.totals.absorb(&source.stats);
        self.sources.push(source);
    }
}

/// Totals recounted from the serialized output.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifiedStats {
    pub networks: u64,
    pub addresses: u64,
}

impl VerifiedStats {
    /// True when the recount agrees with the merge engine's running totals.
    pub fn matches(&self, merged: &IngestStats) -> bool {
        self.networks == merged.networks_retained && self.addresses == merged.addresses_covered
    }
}

/// Everything a successful run reports.
#[derive(Serialize, Debug, Clone)]
pub struct MergeReport {
    pub output: PathBuf,
    pub bytes_written: u64,
    pub merge: MergeStats,
    pub verified: VerifiedStats,
}

impl MergeReport {
    pub fn is_consistent(&self) -> bool {
        self.verified.matches(&self.merge.totals)
    }
}
