//! MMDB data section values and their binary encoding.
//!
//! Only the types the writer emits are supported. Every value is encoded
//! inline; the writer never emits pointers.

use std::collections::BTreeMap;

const TYPE_UTF8_STRING: u8 = 2;
const TYPE_UINT16: u8 = 5;
const TYPE_UINT32: u8 = 6;
const TYPE_MAP: u8 = 7;
const TYPE_UINT64: u8 = 9;
const TYPE_ARRAY: u8 = 11;

/// A value stored in the data section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataValue {
    String(String),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Map(BTreeMap<String, DataValue>),
    Array(Vec<DataValue>),
}

impl DataValue {
    /// The provenance record attached to every merged network.
    pub fn provenance(label: &str) -> DataValue {
        let mut map = BTreeMap::new();
        map.insert("from".to_string(), DataValue::String(label.to_string()));
        DataValue::Map(map)
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    /// Append the encoded value to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            DataValue::String(s) => {
                write_control(out, TYPE_UTF8_STRING, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            DataValue::Uint16(n) => write_uint(out, TYPE_UINT16, *n as u64),
            DataValue::Uint32(n) => write_uint(out, TYPE_UINT32, *n as u64),
            DataValue::Uint64(n) => write_uint(out, TYPE_UINT64, *n),
            DataValue::Map(map) => {
                write_control(out, TYPE_MAP, map.len());
                for (key, value) in map {
                    DataValue::String(key.clone()).encode(out);
                    value.encode(out);
                }
            }
            DataValue::Array(items) => {
                write_control(out, TYPE_ARRAY, items.len());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }
}

/// Unsigned integers are stored big-endian with leading zero bytes dropped.
fn write_uint(out: &mut Vec<u8>, type_num: u8, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    write_control(out, type_num, bytes.len() - skip);
    out.extend_from_slice(&bytes[skip..]);
}

/// Write the control byte, the extended type byte and the size extension.
fn write_control(out: &mut Vec<u8>, type_num: u8, size: usize) {
    let (size_bits, extra): (u8, Vec<u8>) = if size < 29 {
        (size as u8, vec![])
    } else if size < 285 {
        (29, vec![(size - 29) as u8])
    } else if size < 65_821 {
        let n = (size - 285) as u16;
        (30, n.to_be_bytes().to_vec())
    } else {
        let n = (size - 65_821) as u32;
        (31, n.to_be_bytes()[1..].to_vec())
    };

    if type_num <= 7 {
        out.push((type_num << 5) | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend_from_slice(&extra);
}
