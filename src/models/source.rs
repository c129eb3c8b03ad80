//! Provenance labels for input sources.

use std::path::Path;

/// File suffix stripped when deriving a source label.
pub const MMDB_SUFFIX: &str = ".mmdb";

/// Derive the provenance label of a source from its path.
///
/// The label is the file name without the `.mmdb` suffix, e.g.
/// `/data/GeoLite2-ASN.mmdb` is labelled `GeoLite2-ASN`.
pub fn source_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    match name.strip_suffix(MMDB_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}
