//! Output tree.
//!
//! The serializer and the DIE walker build a tree of generic [`Node`]s; this module
//! renders it through `serde`. Numbers are emitted as `[value, "0x%08x"]`, table codes
//! as `[value, "NAME", "description"]` and flag sets as `[value, ["NAME", ...]]`.

use std::collections::BTreeSet;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::tables::LookupTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Code { raw: u64, name: &'static str, description: &'static str },
    Number(u64),
    Signed(i64),
    Flags { raw: u64, names: BTreeSet<&'static str> },
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
    List(Vec<Node>),
    /// Ordered map; keys keep insertion order in the output.
    Map(Vec<(String, Node)>),
}

impl Node {
    pub fn code(table: &LookupTable, raw: u64) -> Self {
        let (name, description) = table.resolve(raw);
        Node::Code { raw, name, description }
    }

    pub fn flags(table: &LookupTable, raw: u64) -> Self {
        Node::Flags { raw, names: table.resolve_flags(raw) }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn map() -> MapBuilder {
        MapBuilder::default()
    }

    /// Looks up `key` in a map node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Node::Number(n) => Some(n),
            Node::Code { raw, .. } | Node::Flags { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Code { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Incremental builder for [`Node::Map`].
#[derive(Debug, Default)]
pub struct MapBuilder {
    entries: Vec<(String, Node)>,
}

impl MapBuilder {
    pub fn field(mut self, key: &str, value: Node) -> Self {
        self.entries.push((key.to_string(), value));
        self
    }

    pub fn number(self, key: &str, value: impl Into<u64>) -> Self {
        self.field(key, Node::Number(value.into()))
    }

    pub fn text(self, key: &str, value: impl Into<String>) -> Self {
        self.field(key, Node::Text(value.into()))
    }

    /// Adds the field only when `value` is present.
    pub fn optional(self, key: &str, value: Option<Node>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    pub fn push(&mut self, key: &str, value: Node) {
        self.entries.push((key.to_string(), value));
    }

    pub fn build(self) -> Node {
        Node::Map(self.entries)
    }
}

fn hex(value: u64) -> String {
    format!("0x{:08x}", value)
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Code { raw, name, description } => (raw, name, description).serialize(serializer),
            Node::Number(n) => (n, hex(*n)).serialize(serializer),
            Node::Signed(n) => (n, hex(*n as u64)).serialize(serializer),
            Node::Flags { raw, names } => (raw, names).serialize(serializer),
            Node::Text(text) => serializer.serialize_str(text),
            Node::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Node::Bool(flag) => serializer.serialize_bool(*flag),
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
