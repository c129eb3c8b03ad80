//! Post-merge verification of the written database.

use super::accounting::address_count;
use super::ingest::NetworkSource;
use crate::error::MergeError;
use crate::mmdb::SourceDatabase;
use crate::models::{IngestStats, VerifiedStats};
use crate::report::Reporter;
use std::path::Path;

/// Reopen the database at `path` and recount its networks and addresses.
///
/// Reads from disk, never from the in-memory tree, so serialization bugs
/// show up as a failure or a mismatch.
pub fn verify(path: &Path) -> Result<VerifiedStats, MergeError> {
    let to_verify_error = |e: MergeError| MergeError::Verify {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let database = SourceDatabase::open(path).map_err(to_verify_error)?;
    let mut verified = VerifiedStats::default();
    for network in database.networks().map_err(to_verify_error)? {
        let network = network.map_err(to_verify_error)?;
        verified.networks += 1;
        verified.addresses = verified
            .addresses
            .wrapping_add(address_count(network.prefix(), network.family()));
    }
    log::debug!(
        "Verified {}: {} networks (IPs: {})",
        path.display(),
        verified.networks,
        verified.addresses
    );
    Ok(verified)
}

/// Compare the recount with the merge totals, reporting any difference.
///
/// A difference is expected when sources overlap, since the tree then
/// splits or replaces networks; it is diagnostic, not an error.
pub fn compare(merged: &IngestStats, verified: &VerifiedStats, reporter: &dyn Reporter) -> bool {
    let consistent = verified.matches(merged);
    if !consistent {
        reporter.mismatch(merged, verified);
    }
    consistent
}
