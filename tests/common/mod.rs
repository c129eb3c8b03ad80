//! Common test utilities for mmdb-merge integration tests

use maxminddb::Reader;
use mmdb_merge::mmdb::{DataValue, Tree, TreeOptions};
use mmdb_merge::models::Network;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Write an input database holding `cidrs`, reserved networks allowed.
pub fn write_fixture(dir: &Path, name: &str, cidrs: &[&str]) -> PathBuf {
    let options = TreeOptions {
        database_type: "Test-Feed".to_string(),
        description: BTreeMap::from([("en".to_string(), format!("fixture {name}"))]),
        languages: vec!["en".to_string()],
        include_reserved_networks: true,
        ..Default::default()
    };
    let mut tree = Tree::new(options).expect("Failed to create fixture tree");
    for (i, cidr) in cidrs.iter().enumerate() {
        let network = Network::parse(cidr).expect("Invalid fixture CIDR");
        let mut record = BTreeMap::new();
        record.insert("vendor".to_string(), DataValue::String(name.to_string()));
        record.insert("rank".to_string(), DataValue::Uint32(i as u32));
        tree.insert(&network, DataValue::Map(record))
            .expect("Failed to insert fixture network");
    }
    let path = dir.join(format!("{name}.mmdb"));
    tree.write_file(&path).expect("Failed to write fixture");
    path
}

/// Provenance tag of the network holding `addr` in the database at `path`.
pub fn tag_of(path: &Path, addr: &str) -> Option<String> {
    let reader = Reader::open_readfile(path).expect("Failed to open output");
    let ip: IpAddr = addr.parse().expect("Invalid address");
    let record: Option<BTreeMap<String, String>> = reader.lookup(ip).ok();
    record.and_then(|r| r.get("from").cloned())
}
