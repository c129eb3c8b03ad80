//! In-memory binary trie that serializes to the MaxMind DB format.
//!
//! The tree always uses IPv6 addressing. IPv4 networks live in the
//! `::/96` subtree, as `::a.b.c.d/(96 + prefix)`. The IPv4-mapped
//! (`::ffff:0:0/96`) and 6to4 (`2002::/16`) prefixes are aliases whose
//! records point at that subtree.

use super::data::DataValue;
use super::error::{InsertError, TreeError};
use super::reserved::TREE_RESERVED;
use crate::models::Network;
use crate::processing::MergeTarget;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

/// Marker preceding the metadata map: "\xAB\xCD\xEFMaxMind.com".
pub const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";

const DATA_SECTION_SEPARATOR: [u8; 16] = [0; 16];
const TREE_DEPTH: u8 = 128;
const IPV4_SUBTREE_DEPTH: u8 = 96;

/// Prefixes aliased to the IPv4 subtree, as tree keys.
const IPV4_ALIASES: [(u128, u8); 2] = [
    (0xffff_0000_0000, 96), // ::ffff:0:0/96
    (0x2002 << 112, 16),    // 2002::/16
];

/// Configuration of a new [`Tree`].
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Addressing mode. Only 6 (dual stack) is supported.
    pub ip_version: u16,
    pub database_type: String,
    /// Human readable description, keyed by language code.
    pub description: BTreeMap<String, String>,
    pub languages: Vec<String>,
    /// Bits per search tree record: 24, 28 or 32.
    pub record_size: u16,
    /// Accept networks inside reserved space instead of rejecting them.
    pub include_reserved_networks: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            ip_version: 6,
            database_type: String::new(),
            description: BTreeMap::new(),
            languages: vec![],
            record_size: 28,
            include_reserved_networks: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Empty,
    /// Index into the tree's interned values.
    Leaf(usize),
    Internal(Box<[Node; 2]>),
    /// Continues the lookup in the IPv4 subtree.
    Alias,
}

/// A mutable network database.
///
/// Inserting is last-writer-wins: a network replaces every more specific
/// network beneath it, and splits a less specific one it falls inside.
#[derive(Debug)]
pub struct Tree {
    options: TreeOptions,
    root: Node,
    values: Vec<DataValue>,
    value_index: HashMap<DataValue, usize>,
}

/// Position of a network in the 128-bit tree.
fn tree_key(network: &Network) -> (u128, u8) {
    match network.addr() {
        IpAddr::V4(v4) => (
            u32::from(v4) as u128,
            network.prefix() + IPV4_SUBTREE_DEPTH,
        ),
        IpAddr::V6(v6) => (u128::from(v6), network.prefix()),
    }
}

fn key_to_addr(key: u128, depth: u8) -> Result<Network, String> {
    let v6 = Ipv6Addr::from(key);
    let is_ipv4 = depth >= IPV4_SUBTREE_DEPTH && key >> 32 == 0;
    let result = if is_ipv4 {
        Network::new(
            IpAddr::V4(Ipv4Addr::from(key as u32)),
            depth - IPV4_SUBTREE_DEPTH,
        )
    } else {
        Network::new(IpAddr::V6(v6), depth)
    };
    result.map_err(|e| e.to_string())
}

/// True when the first `len` bits of `a` and `b` are equal.
fn same_prefix(a: u128, b: u128, len: u8) -> bool {
    match len {
        0 => true,
        _ => (a ^ b) >> (TREE_DEPTH - len) == 0,
    }
}

fn bit_at(key: u128, depth: u8) -> usize {
    ((key >> (TREE_DEPTH - 1 - depth)) & 1) as usize
}

/// Replace the subtree at `key/target` with `value`, splitting leaves on the way.
fn set_node(node: &mut Node, key: u128, depth: u8, target: u8, value: Node) {
    if depth == target {
        *node = value;
        return;
    }
    if matches!(node, Node::Empty) && matches!(value, Node::Empty) {
        return;
    }
    if !matches!(node, Node::Internal(_)) {
        let old = std::mem::replace(node, Node::Empty);
        *node = Node::Internal(Box::new([old.clone(), old]));
    }
    if let Node::Internal(children) = node {
        set_node(&mut children[bit_at(key, depth)], key, depth + 1, target, value);
        if matches!(children[0], Node::Empty) && matches!(children[1], Node::Empty) {
            *node = Node::Empty;
        }
    }
}

fn count_leaves(node: &Node) -> u64 {
    match node {
        Node::Empty | Node::Alias => 0,
        Node::Leaf(_) => 1,
        Node::Internal(children) => count_leaves(&children[0]) + count_leaves(&children[1]),
    }
}

impl Tree {
    /// Create an empty tree.
    pub fn new(options: TreeOptions) -> Result<Tree, TreeError> {
        if options.ip_version != 6 {
            return Err(TreeError::UnsupportedIpVersion(options.ip_version));
        }
        if ![24, 28, 32].contains(&options.record_size) {
            return Err(TreeError::UnsupportedRecordSize(options.record_size));
        }
        let mut tree = Tree {
            options,
            root: Node::Empty,
            values: vec![],
            value_index: HashMap::new(),
        };
        tree.restore_aliases(0, 0);
        Ok(tree)
    }

    /// Re-point every alias below `key/depth` at the IPv4 subtree.
    fn restore_aliases(&mut self, key: u128, depth: u8) {
        for (akey, adepth) in IPV4_ALIASES {
            if adepth >= depth && same_prefix(key, akey, depth) {
                set_node(&mut self.root, akey, 0, adepth, Node::Alias);
            }
        }
    }

    /// Insert or overwrite the value of `network`.
    ///
    /// Unless reserved networks are allowed, a network inside reserved space is
    /// rejected with [`InsertError::Reserved`], and reserved blocks inside a
    /// larger network are left empty. Networks inside an IPv4 alias are
    /// rejected with [`InsertError::Aliased`]; a larger network keeps the
    /// aliases it covers.
    pub fn insert(&mut self, network: &Network, value: DataValue) -> Result<(), InsertError> {
        let (key, depth) = tree_key(network);
        let inside_alias = IPV4_ALIASES
            .iter()
            .any(|(akey, adepth)| depth >= *adepth && same_prefix(key, *akey, *adepth));
        if inside_alias {
            return Err(InsertError::Aliased(*network));
        }
        if !self.options.include_reserved_networks {
            let inside_reserved = TREE_RESERVED.iter().any(|block| {
                let (rkey, rdepth) = tree_key(block);
                depth >= rdepth && same_prefix(key, rkey, rdepth)
            });
            if inside_reserved {
                return Err(InsertError::Reserved(*network));
            }
        }

        let index = self.intern(value);
        set_node(&mut self.root, key, 0, depth, Node::Leaf(index));

        if !self.options.include_reserved_networks {
            for block in TREE_RESERVED.iter() {
                let (rkey, rdepth) = tree_key(block);
                if rdepth > depth && same_prefix(key, rkey, depth) {
                    log::trace!("carving reserved {} out of {}", block, network);
                    set_node(&mut self.root, rkey, 0, rdepth, Node::Empty);
                }
            }
        }
        self.restore_aliases(key, depth);
        Ok(())
    }

    fn intern(&mut self, value: DataValue) -> usize {
        if let Some(index) = self.value_index.get(&value) {
            return *index;
        }
        let index = self.values.len();
        self.values.push(value.clone());
        self.value_index.insert(value, index);
        index
    }

    /// Longest-prefix match for `addr`.
    pub fn lookup(&self, addr: IpAddr) -> Option<&DataValue> {
        let key = match addr {
            IpAddr::V4(v4) => u32::from(v4) as u128,
            IpAddr::V6(v6) => u128::from(v6),
        };
        let mut node = &self.root;
        let mut depth = 0;
        loop {
            match node {
                Node::Empty => return None,
                Node::Leaf(index) => return self.values.get(*index),
                Node::Alias => {
                    // The next 32 bits of the key are the IPv4 address.
                    let mapped = (key << depth) >> (TREE_DEPTH - 32);
                    return self.lookup(IpAddr::V4(Ipv4Addr::from(mapped as u32)));
                }
                Node::Internal(children) => {
                    node = &children[bit_at(key, depth)];
                    depth += 1;
                }
            }
        }
    }

    /// Number of networks that will be serialized.
    pub fn network_count(&self) -> u64 {
        count_leaves(&self.root)
    }

    /// Every stored network with its value, in address order.
    pub fn networks(&self) -> Vec<(Network, &DataValue)> {
        let mut found = vec![];
        let mut stack = vec![(&self.root, 0u128, 0u8)];
        while let Some((node, key, depth)) = stack.pop() {
            match node {
                Node::Empty | Node::Alias => {}
                Node::Leaf(index) => {
                    if let Ok(network) = key_to_addr(key, depth) {
                        found.push((network, &self.values[*index]));
                    }
                }
                Node::Internal(children) => {
                    let right = key | (1u128 << (TREE_DEPTH - 1 - depth));
                    stack.push((&children[1], right, depth + 1));
                    stack.push((&children[0], key, depth + 1));
                }
            }
        }
        found
    }

    fn metadata(&self, node_count: u64) -> DataValue {
        let description = self
            .options
            .description
            .iter()
            .map(|(lang, text)| (lang.clone(), DataValue::String(text.clone())))
            .collect();
        let languages = self
            .options
            .languages
            .iter()
            .map(|lang| DataValue::String(lang.clone()))
            .collect();
        let build_epoch = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);

        let mut map = BTreeMap::new();
        map.insert("binary_format_major_version".to_string(), DataValue::Uint16(2));
        map.insert("binary_format_minor_version".to_string(), DataValue::Uint16(0));
        map.insert("build_epoch".to_string(), DataValue::Uint64(build_epoch));
        map.insert(
            "database_type".to_string(),
            DataValue::String(self.options.database_type.clone()),
        );
        map.insert("description".to_string(), DataValue::Map(description));
        map.insert(
            "ip_version".to_string(),
            DataValue::Uint16(self.options.ip_version),
        );
        map.insert("languages".to_string(), DataValue::Array(languages));
        map.insert(
            "node_count".to_string(),
            DataValue::Uint32(node_count as u32),
        );
        map.insert(
            "record_size".to_string(),
            DataValue::Uint16(self.options.record_size),
        );
        DataValue::Map(map)
    }

    /// The node at `::/96`, or the shallower non-internal node covering it.
    fn ipv4_root(&self) -> &Node {
        let mut node = &self.root;
        for _ in 0..IPV4_SUBTREE_DEPTH {
            match node {
                Node::Internal(children) => node = &children[0],
                _ => break,
            }
        }
        node
    }

    /// Serialize the tree: search tree, separator, data section, metadata.
    ///
    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<u64, TreeError> {
        // Number internal nodes breadth-first; a non-internal root still
        // needs one node pointing both ways.
        let ipv4_root = self.ipv4_root();
        let mut ipv4_root_number = None;
        let mut nodes: Vec<[&Node; 2]> = vec![];
        nodes.push(match &self.root {
            Node::Internal(children) => [&children[0], &children[1]],
            other => [other, other],
        });
        let mut i = 0;
        while i < nodes.len() {
            for child in nodes[i] {
                if let Node::Internal(children) = child {
                    if std::ptr::eq(child, ipv4_root) {
                        ipv4_root_number = Some(nodes.len() as u64);
                    }
                    nodes.push([&children[0], &children[1]]);
                }
            }
            i += 1;
        }

        let node_count = nodes.len() as u64;
        let max_record = (1u64 << self.options.record_size) - 1;
        let pointer_base = node_count + DATA_SECTION_SEPARATOR.len() as u64;
        let mut data: Vec<u8> = vec![];
        let mut offsets: HashMap<usize, u64> = HashMap::new();
        let mut leaf_record = |index: usize| {
            let offset = *offsets.entry(index).or_insert_with(|| {
                let offset = data.len() as u64;
                self.values[index].encode(&mut data);
                offset
            });
            pointer_base + offset
        };

        let alias_record = match (ipv4_root, ipv4_root_number) {
            (Node::Internal(_), Some(number)) => number,
            (Node::Leaf(index), _) => leaf_record(*index),
            _ => node_count,
        };
        let mut next_node = 1u64;
        let mut tree_bytes = Vec::with_capacity(nodes.len() * self.options.record_size as usize / 4);

        for pair in &nodes {
            let mut records = [0u64; 2];
            for (side, child) in pair.iter().enumerate() {
                records[side] = match child {
                    Node::Empty => node_count,
                    Node::Alias => alias_record,
                    Node::Internal(_) => {
                        let number = next_node;
                        next_node += 1;
                        number
                    }
                    Node::Leaf(index) => leaf_record(*index),
                };
                if records[side] > max_record {
                    return Err(TreeError::Capacity {
                        record: records[side],
                        record_size: self.options.record_size,
                    });
                }
            }
            write_node(&mut tree_bytes, self.options.record_size, records[0], records[1]);
        }

        let metadata = self.metadata(node_count).to_bytes();
        out.write_all(&tree_bytes)?;
        out.write_all(&DATA_SECTION_SEPARATOR)?;
        out.write_all(&data)?;
        out.write_all(METADATA_MARKER)?;
        out.write_all(&metadata)?;

        log::debug!(
            "serialized {} nodes, {} data bytes, {} metadata bytes",
            node_count,
            data.len(),
            metadata.len()
        );
        Ok((tree_bytes.len()
            + DATA_SECTION_SEPARATOR.len()
            + data.len()
            + METADATA_MARKER.len()
            + metadata.len()) as u64)
    }

    /// Create `path` and serialize into it.
    pub fn write_file(&self, path: &Path) -> Result<u64, TreeError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let written = self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(written)
    }
}

/// Append one node of two records.
fn write_node(out: &mut Vec<u8>, record_size: u16, left: u64, right: u64) {
    let (l, r) = (left as u32, right as u32);
    match record_size {
        24 => {
            out.extend_from_slice(&l.to_be_bytes()[1..]);
            out.extend_from_slice(&r.to_be_bytes()[1..]);
        }
        28 => {
            // | left[23..0] | left[27..24]:right[27..24] | right[23..0] |
            out.extend_from_slice(&l.to_be_bytes()[1..]);
            out.push((((l >> 24) & 0x0F) << 4) as u8 | ((r >> 24) & 0x0F) as u8);
            out.extend_from_slice(&r.to_be_bytes()[1..]);
        }
        _ => {
            out.extend_from_slice(&l.to_be_bytes());
            out.extend_from_slice(&r.to_be_bytes());
        }
    }
}

impl MergeTarget for Tree {
    fn insert(&mut self, network: &Network, record: &DataValue) -> Result<(), InsertError> {
        Tree::insert(self, network, record.clone())
    }
}
