//! Generic serialized node.
//!
//! [`Node`] is the structured value that tensors and storages save to and
//! restore from. Encoding a node to JSON, CSV or a binary format is left to
//! serializers built on top of the `serde` implementations.
//!
//! ```rust
//! use tensorview::Node;
//!
//! let mut node = Node::Null;
//! node.set("dims", Node::from(vec![Node::from(2u64), Node::from(3u64)]));
//! assert_eq!(node.get("dims").and_then(Node::len), Some(2));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A structured value: scalar, list, or string-keyed map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer above `i64::MAX`
    UInt(u64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list
    List(Vec<Node>),
    /// Map with ordered keys
    Map(BTreeMap<String, Node>),
}

impl Node {
    /// Create an empty map node.
    pub fn map() -> Self {
        Node::Map(BTreeMap::new())
    }

    /// Create an empty list node.
    pub fn list() -> Self {
        Node::List(Vec::new())
    }

    /// Look up a key. Returns `None` for non-map nodes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Look up a key, failing with a descriptive error if it is missing.
    pub fn require(&self, key: &str) -> Result<&Node> {
        self.get(key)
            .ok_or_else(|| Error::node(format!("missing field '{key}'")))
    }

    /// Insert a key. A `Null` node becomes a map; any other non-map node is replaced.
    pub fn set(&mut self, key: impl Into<String>, value: Node) {
        if !matches!(self, Node::Map(_)) {
            *self = Node::map();
        }
        if let Node::Map(map) = self {
            map.insert(key.into(), value);
        }
    }

    /// Element of a list node.
    pub fn at(&self, index: usize) -> Option<&Node> {
        match self {
            Node::List(items) => items.get(index),
            _ => None,
        }
    }

    /// Overwrite an element of a list node.
    pub fn set_at(&mut self, index: usize, value: Node) -> Result<()> {
        match self {
            Node::List(items) => {
                let len = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or(Error::IndexOutOfBounds { index, size: len })?;
                *slot = value;
                Ok(())
            }
            other => Err(Error::node(format!(
                "cannot index into {} node",
                other.kind()
            ))),
        }
    }

    /// Append to a list node. A `Null` node becomes a list.
    pub fn push(&mut self, value: Node) -> Result<()> {
        if matches!(self, Node::Null) {
            *self = Node::list();
        }
        match self {
            Node::List(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(Error::node(format!("cannot push onto {} node", other.kind()))),
        }
    }

    /// Number of entries of a list or map node.
    pub fn len(&self) -> Option<usize> {
        match self {
            Node::List(items) => Some(items.len()),
            Node::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Borrow the items of a list node.
    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Integer value. Floats with no fractional part are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Node::Int(v) => Some(v),
            Node::UInt(v) => i64::try_from(v).ok(),
            // i64::MAX as f64 rounds up to 2^63, which is already out of range
            Node::Float(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                Some(v as i64)
            }
            _ => None,
        }
    }

    /// Non-negative integer value. Floats with no fractional part are accepted.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Node::Int(v) => u64::try_from(v).ok(),
            Node::UInt(v) => Some(v),
            Node::Float(v) if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 => {
                Some(v as u64)
            }
            _ => None,
        }
    }

    /// Non-negative integer value as `usize`.
    pub fn as_usize(&self) -> Option<usize> {
        self.as_u64().and_then(|v| usize::try_from(v).ok())
    }

    /// Floating point value. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Node::Float(v) => Some(v),
            Node::Int(v) => Some(v as f64),
            Node::UInt(v) => Some(v as f64),
            _ => None,
        }
    }

    /// String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Variant name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::UInt(_) => "uint",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<u64> for Node {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Node::Int(v),
            Err(_) => Node::UInt(value),
        }
    }
}

impl From<usize> for Node {
    fn from(value: usize) -> Self {
        Node::from(value as u64)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(value)
    }
}
