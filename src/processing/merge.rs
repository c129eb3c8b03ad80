//! Merge orchestration across sources.

use super::ingest::{ingest, MergeTarget, NetworkSource};
use crate::error::MergeError;
use crate::models::{MergeStats, SourceStats};
use crate::report::Reporter;

/// Merge every source into `target`, strictly in the given order.
///
/// Later sources overwrite earlier ones where networks collide; the engine
/// itself does no deduplication. The first fatal error aborts the whole merge.
/// Sources are pulled one at a time and dropped once ingested, so a lazy
/// iterator keeps a single source open.
///
/// # Arguments
/// * `sources` - `(database, label)` pairs in merge order, or the error opening one
/// * `target` - Database receiving the networks
/// * `reporter` - Receives diagnostics
///
/// # Returns
/// * `Ok(MergeStats)` - Per-source statistics and totals
pub fn merge<S, I>(
    sources: I,
    target: &mut dyn MergeTarget,
    reporter: &dyn Reporter,
) -> Result<MergeStats, MergeError>
where
    S: NetworkSource,
    I: IntoIterator<Item = Result<(S, String), MergeError>>,
{
    let mut merged = MergeStats::default();
    for source in sources {
        let (database, label) = source?;
        log::debug!("Processing source: {label}");
        let stats = ingest(database.networks()?, &label, target, reporter)?;
        merged.push(SourceStats { label, stats });
    }
    Ok(merged)
}
