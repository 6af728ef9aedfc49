//! Numeric element types and algebraic structures.
//!
//! This module defines the [`Scalar`] trait every tensor element implements,
//! and the [`Semiring`] trait used by reductions and the backend boundary, with
//! [`Standard<T>`] as the `(+, ×)` instance.

mod semiring;
mod standard;

pub use semiring::Semiring;
pub use standard::Standard;

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use num_traits::{Bounded, One, Zero};

use crate::node::Node;

/// Element types that can be stored in a tensor.
///
/// Requires the zero/one identities, addition, subtraction, multiplication and
/// ordering, plus a lossless mapping onto the typed values of a [`Node`].
pub trait Scalar:
    Copy
    + Default
    + Debug
    + PartialOrd
    + Zero
    + One
    + Bounded
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + 'static
{
    /// Convert to a serialized value.
    fn to_node(self) -> Node;

    /// Read back from a serialized value. `None` if the node has the wrong type
    /// or the value does not fit.
    fn from_node(node: &Node) -> Option<Self>;
}

macro_rules! impl_scalar_float {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            #[inline]
            fn to_node(self) -> Node {
                Node::Float(self as f64)
            }

            #[inline]
            fn from_node(node: &Node) -> Option<Self> {
                node.as_f64().map(|v| v as $t)
            }
        }
    )*};
}

macro_rules! impl_scalar_int {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            #[inline]
            fn to_node(self) -> Node {
                Node::Int(self as i64)
            }

            #[inline]
            fn from_node(node: &Node) -> Option<Self> {
                node.as_i64().and_then(|v| <$t>::try_from(v).ok())
            }
        }
    )*};
}

impl_scalar_float!(f32, f64);
impl_scalar_int!(i32, i64, u32);

impl Scalar for u64 {
    #[inline]
    fn to_node(self) -> Node {
        Node::from(self)
    }

    #[inline]
    fn from_node(node: &Node) -> Option<Self> {
        node.as_u64()
    }
}
