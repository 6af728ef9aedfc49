//! Error types for tensorview.

use thiserror::Error;

/// Result type alias using tensorview's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by storage, tensor and backend operations.
///
/// Every error is detected before any caller-visible state is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operand shapes are incompatible for the requested operation.
    #[error("{op}: shape mismatch, expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Operation that detected the mismatch
        op: &'static str,
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Element index outside the extent of a dimension.
    #[error("index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Extent of the dimension
        size: usize,
    },

    /// Dimension number outside the tensor's rank.
    #[error("invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: usize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Resolved storage offset past the end of the backing storage.
    #[error("storage index {index} out of bounds for storage of length {len}")]
    StorageOutOfBounds {
        /// Resolved storage index
        index: usize,
        /// Storage length
        len: usize,
    },

    /// Operation requires a contiguous tensor.
    #[error("{op} requires a contiguous tensor")]
    NotContiguous {
        /// Operation name
        op: &'static str,
    },

    /// Element counts differ where they must be equal.
    #[error("{op}: element count mismatch, expected {expected}, got {got}")]
    CardinalityMismatch {
        /// Operation name
        op: &'static str,
        /// Expected number of elements
        expected: usize,
        /// Actual number of elements
        got: usize,
    },

    /// `expand` on a dimension whose extent is not 1.
    #[error("cannot expand dimension {dim} of size {size}, only size-1 dimensions can be expanded")]
    ExpandNonSingleton {
        /// Dimension requested
        dim: usize,
        /// Its current extent
        size: usize,
    },

    /// Any other invalid request (empty shapes, malformed specs).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A serialized node does not follow the tensor/storage layout.
    #[error("malformed node: {0}")]
    Node(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(op: &'static str, expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            op,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a malformed-node error
    pub fn node(reason: impl Into<String>) -> Self {
        Self::Node(reason.into())
    }
}
