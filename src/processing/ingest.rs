//! Ingestion of a single source into the merge target.

use super::reserved::is_reserved_network;
use crate::error::MergeError;
use crate::mmdb::{DataValue, InsertError};
use crate::models::{IngestStats, Network, SourceStats};
use crate::report::Reporter;

/// Emit a progress line every this many retained networks.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Forward-only pass over the networks of a source.
pub type NetworkIter<'a> = Box<dyn Iterator<Item = Result<Network, MergeError>> + 'a>;

/// A database whose networks can be iterated.
///
/// Each call to [`NetworkSource::networks`] starts a fresh pass.
pub trait NetworkSource {
    fn networks(&self) -> Result<NetworkIter<'_>, MergeError>;
}

impl NetworkSource for Vec<Network> {
    fn networks(&self) -> Result<NetworkIter<'_>, MergeError> {
        Ok(Box::new(self.iter().copied().map(Ok)))
    }
}

/// The database networks are merged into.
pub trait MergeTarget {
    /// Insert or overwrite `record` for `network`.
    fn insert(&mut self, network: &Network, record: &DataValue) -> Result<(), InsertError>;
}

/// Ingest every network of one source into `target`.
///
/// Reserved networks are skipped, whether caught by the local filter or
/// rejected as reserved by the target. Any other insert failure aborts.
///
/// # Arguments
/// * `networks` - The source's networks, consumed once
/// * `label` - Provenance tag written into every record
/// * `target` - Database receiving the networks
/// * `reporter` - Receives skip warnings and progress
///
/// # Returns
/// * `Ok(IngestStats)` - Counters for this source
/// * `Err(MergeError)` - A read error or a non-reserved insert failure
pub fn ingest<I>(
    networks: I,
    label: &str,
    target: &mut dyn MergeTarget,
    reporter: &dyn Reporter,
) -> Result<IngestStats, MergeError>
where
    I: IntoIterator<Item = Result<Network, MergeError>>,
{
    let record = DataValue::provenance(label);
    let mut stats = IngestStats::default();

    for network in networks {
        let network = network?;
        if is_reserved_network(&network) {
            reporter.skipped(&network, label);
            stats.record_skipped();
            continue;
        }

        match target.insert(&network, &record) {
            Ok(()) => {}
            Err(InsertError::Reserved(_)) => {
                reporter.skipped(&network, label);
                stats.record_skipped();
                continue;
            }
            Err(source) => {
                return Err(MergeError::Insert {
                    label: label.to_string(),
                    network,
                    source,
                })
            }
        }

        stats.record_retained(&network);
        if stats.networks_retained % PROGRESS_INTERVAL == 0 {
            reporter.progress(label, stats.networks_retained);
        }
    }

    reporter.source_done(&SourceStats {
        label: label.to_string(),
        stats,
    });
    Ok(stats)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::report::testing::RecordingReporter;
    use std::collections::BTreeMap;

    /// In-memory target that rejects chosen networks.
    #[derive(Default)]
    pub(crate) struct MapTarget {
        pub records: BTreeMap<Network, DataValue>,
        pub reserved: Vec<Network>,
        pub broken: Vec<Network>,
    }

    impl MergeTarget for MapTarget {
        fn insert(&mut self, network: &Network, record: &DataValue) -> Result<(), InsertError> {
            if self.reserved.contains(network) {
                return Err(InsertError::Reserved(*network));
            }
            if self.broken.contains(network) {
                return Err(InsertError::InvalidNetwork(network.to_string()));
            }
            self.records.insert(*network, record.clone());
            Ok(())
        }
    }

    pub(crate) fn nets(cidrs: &[&str]) -> Vec<Network> {
        cidrs.iter().map(|c| Network::parse(c).unwrap()).collect()
    }

    #[test]
    fn test_ingest_skips_reserved_and_tags() {
        let source = nets(&["10.0.0.0/8", "1.1.1.0/24"]);
        let mut target = MapTarget::default();
        let reporter = RecordingReporter::default();

        let stats = ingest(source.networks().unwrap(), "feed", &mut target, &reporter).unwrap();

        assert_eq!(stats.networks_retained, 1);
        assert_eq!(stats.networks_skipped, 1);
        assert_eq!(stats.addresses_covered, 256);
        assert_eq!(
            target.records.get(&source[1]),
            Some(&DataValue::provenance("feed"))
        );
        assert!(!target.records.contains_key(&source[0]));
        assert_eq!(
            reporter.skipped.borrow().as_slice(),
            &[(source[0], "feed".to_string())]
        );
        assert_eq!(reporter.done.borrow().len(), 1);
    }

    #[test]
    fn test_ingest_target_reserved_is_skip() {
        let source = nets(&["198.18.0.0/24", "8.8.8.0/24"]);
        let mut target = MapTarget {
            reserved: vec![source[0]],
            ..Default::default()
        };
        let reporter = RecordingReporter::default();

        let stats = ingest(source.networks().unwrap(), "feed", &mut target, &reporter).unwrap();

        assert_eq!(stats.networks_retained, 1);
        assert_eq!(stats.networks_skipped, 1);
        assert_eq!(reporter.skipped.borrow().len(), 1);
    }

    #[test]
    fn test_ingest_other_insert_error_aborts() {
        let source = nets(&["1.1.1.0/24", "8.8.8.0/24", "9.9.9.0/24"]);
        let mut target = MapTarget {
            broken: vec![source[1]],
            ..Default::default()
        };
        let reporter = RecordingReporter::default();

        let err = ingest(source.networks().unwrap(), "feed", &mut target, &reporter).unwrap_err();

        match err {
            MergeError::Insert { label, network, .. } => {
                assert_eq!(label, "feed");
                assert_eq!(network, source[1]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!target.records.contains_key(&source[2]));
        assert!(reporter.done.borrow().is_empty());
    }

    #[test]
    fn test_ingest_read_error_aborts() {
        let items = vec![
            Ok(Network::parse("1.1.1.0/24").unwrap()),
            Err(MergeError::SourceRead {
                label: "feed".to_string(),
                reason: "corrupt tree".to_string(),
            }),
        ];
        let mut target = MapTarget::default();
        let reporter = RecordingReporter::default();

        let err = ingest(items, "feed", &mut target, &reporter).unwrap_err();
        assert!(matches!(err, MergeError::SourceRead { .. }));
    }

    #[test]
    fn test_ingest_counts_every_network() {
        let source = nets(&[
            "0.0.0.0/8",
            "1.0.0.0/24",
            "127.0.0.1/32",
            "2001:4860::/32",
            "fe80::/64",
            "ff02::1/128",
            "2606:4700::6810:84e5/128",
        ]);
        let mut target = MapTarget::default();
        let reporter = RecordingReporter::default();

        let stats = ingest(source.networks().unwrap(), "feed", &mut target, &reporter).unwrap();

        assert_eq!(stats.networks_seen(), source.len() as u64);
        assert_eq!(stats.networks_retained, 3);
        assert_eq!(stats.networks_skipped, 4);
        // 2001:4860::/32 is too large to count.
        assert_eq!(stats.addresses_covered, 256 + 1);
    }

    #[test]
    fn test_ingest_progress_interval() {
        let source: Vec<Network> = (0..PROGRESS_INTERVAL as u32 * 2)
            .map(|i| {
                let addr = std::net::Ipv4Addr::from(0x0100_0000u32 + i);
                Network::new(addr.into(), 32).unwrap()
            })
            .collect();
        let mut target = MapTarget::default();
        let reporter = RecordingReporter::default();

        ingest(source.networks().unwrap(), "feed", &mut target, &reporter).unwrap();

        assert_eq!(
            reporter.progress.borrow().as_slice(),
            &[
                ("feed".to_string(), PROGRESS_INTERVAL),
                ("feed".to_string(), PROGRESS_INTERVAL * 2)
            ]
        );
    }

    #[test]
    fn test_ingest_idempotent_statistics() {
        let source = nets(&["10.0.0.0/8", "1.1.1.0/24", "8.8.0.0/16"]);
        let reporter = RecordingReporter::default();

        let mut first = MapTarget::default();
        let a = ingest(source.networks().unwrap(), "feed", &mut first, &reporter).unwrap();
        let mut second = MapTarget::default();
        let b = ingest(source.networks().unwrap(), "feed", &mut second, &reporter).unwrap();

        assert_eq!(a, b);
        assert_eq!(first.records, second.records);
    }
}
