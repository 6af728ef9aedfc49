//! Saving and restoring tensors through [`Node`].
//!
//! A saved tensor is a map with two fields:
//! - `dims`: list of extents
//! - `data`: flat list of values in row-major order, `product(dims)` long
//!
//! Only the viewed elements are saved, not the whole storage, so a restored
//! tensor is always contiguous and never shares storage.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{validate_shape, Tensor};
use crate::algebra::Scalar;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::storage::Storage;

impl<T: Scalar> Tensor<T> {
    /// Save shape and values.
    pub fn save(&self) -> Node {
        let mut node = Node::map();
        node.set(
            "dims",
            Node::List(self.shape.iter().map(|&d| Node::from(d)).collect()),
        );
        node.set(
            "data",
            Node::List(self.values().map(Scalar::to_node).collect()),
        );
        node
    }

    /// Restore a tensor saved with [`save`](Self::save).
    pub fn from_node(node: &Node) -> Result<Self> {
        let dims = node
            .require("dims")?
            .as_list()
            .ok_or_else(|| Error::node("'dims' must be a list"))?
            .iter()
            .enumerate()
            .map(|(i, d)| {
                d.as_usize()
                    .ok_or_else(|| Error::node(format!("dims[{i}] is not a valid extent")))
            })
            .collect::<Result<Vec<usize>>>()?;
        if dims.is_empty() {
            return Err(Error::node("'dims' must not be empty"));
        }
        let numel = validate_shape(&dims)?;

        let data = Storage::<T>::from_node(node.require("data")?)?;
        if data.len() != numel {
            return Err(Error::CardinalityMismatch {
                op: "from_node",
                expected: numel,
                got: data.len(),
            });
        }

        Ok(Self::from_storage(data, dims))
    }
}

impl<T: Scalar> TryFrom<&Node> for Tensor<T> {
    type Error = Error;

    fn try_from(node: &Node) -> Result<Self> {
        Self::from_node(node)
    }
}

impl<T: Scalar> Serialize for Tensor<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.save().serialize(serializer)
    }
}

impl<'de, T: Scalar> Deserialize<'de> for Tensor<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Node::deserialize(deserializer)?;
        Self::from_node(&node).map_err(D::Error::custom)
    }
}
