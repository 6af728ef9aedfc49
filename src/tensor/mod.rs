//! Stride-based tensor views over shared storage.
//!
//! The [`Tensor`] type supports:
//! - Zero-copy views (`view`, `select`, `narrow`, `expand`, `sub`, `transpose`, `permute`)
//! - Copying operations (`reshape`, `copy`, `copy_from`, `contiguous`)
//! - Row-major iteration over any stride pattern ([`TensorIter`])
//! - Re-merging independent tensors into one buffer ([`vectorize`], [`concatenate`])
//!
//! Cloning a tensor never copies elements: the clone is another view of the
//! same storage, and writes through either are visible through both.

mod flatten;
mod iter;
mod ops;
mod serialize;
mod shape;

use std::fmt;

use crate::algebra::Scalar;
use crate::error::{Error, Result};
use crate::storage::{SharedStorage, Storage};

pub use flatten::{concatenate, vectorize};
pub use iter::{Offsets, TensorIter, Values};
pub use ops::for_each_n;
pub use shape::SubRange;

/// A multi-dimensional view into a shared, reference-counted storage.
///
/// Logical element `(i0, .., ik)` lives at storage index
/// `offset + Σ ij * strides[j]`. A tensor always has at least one dimension;
/// the empty tensor is one-dimensional with extent 0.
///
/// # Example
///
/// ```rust
/// use tensorview::Tensor;
///
/// let a = Tensor::<f32>::from_data(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let b = a.transpose(0, 1).unwrap();   // zero-copy, shape [3, 2]
/// assert!(!b.is_contiguous());
/// assert_eq!(b.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
///
/// let c = b.copy().unwrap();           // contiguous private copy
/// assert!(c.is_contiguous());
/// assert!(!c.shared_with(&a));
/// ```
#[derive(Clone)]
pub struct Tensor<T: Scalar> {
    /// Shared storage (reference counted)
    storage: SharedStorage<T>,

    /// Shape of this view
    shape: Vec<usize>,

    /// Strides for each dimension (in elements)
    strides: Vec<usize>,

    /// Offset into storage
    offset: usize,

    /// Cached product of `shape`
    numel: usize,

    /// Cached row-major stride test
    contiguous: bool,
}

impl<T: Scalar> Tensor<T> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty one-dimensional tensor with fresh storage.
    pub fn new() -> Self {
        Self::from_storage(Storage::new(), vec![0])
    }

    /// Create a one-dimensional tensor holding a copy of `values`.
    pub fn from_slice(values: &[T]) -> Self {
        Self::from_storage(Storage::from_slice(values), vec![values.len()])
    }

    /// Create a tensor from row-major data with the given shape.
    pub fn from_data(data: &[T], shape: &[usize]) -> Result<Self> {
        let numel = validate_shape(shape)?;
        if data.len() != numel {
            return Err(Error::CardinalityMismatch {
                op: "from_data",
                expected: numel,
                got: data.len(),
            });
        }
        Ok(Self::from_storage(Storage::from_slice(data), shape.to_vec()))
    }

    /// Create a zero-filled tensor.
    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::full(shape, T::zero())
    }

    /// Create a tensor with every element set to `value`.
    pub fn full(shape: &[usize], value: T) -> Result<Self> {
        let numel = validate_shape(shape)?;
        Ok(Self::from_storage(
            Storage::with_len(numel, value),
            shape.to_vec(),
        ))
    }

    /// Wrap a storage as a contiguous tensor of the given shape starting at index 0.
    fn from_storage(storage: Storage<T>, shape: Vec<usize>) -> Self {
        let strides = compute_contiguous_strides(&shape);
        Self::from_parts(SharedStorage::new(storage), shape, strides, 0)
    }

    /// Describe a region of an existing storage.
    pub(crate) fn from_parts(
        storage: SharedStorage<T>,
        shape: Vec<usize>,
        strides: Vec<usize>,
        offset: usize,
    ) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        debug_assert!(!shape.is_empty());
        let numel = shape.iter().product();
        let contiguous = is_contiguous_layout(&shape, &strides);
        Self {
            storage,
            shape,
            strides,
            offset,
            numel,
            contiguous,
        }
    }

    /// Replace the layout and recompute the cached size and contiguity.
    pub(crate) fn set_layout(&mut self, shape: Vec<usize>, strides: Vec<usize>, offset: usize) {
        debug_assert_eq!(shape.len(), strides.len());
        self.numel = shape.iter().product();
        self.contiguous = is_contiguous_layout(&shape, &strides);
        self.shape = shape;
        self.strides = strides;
        self.offset = offset;
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    /// Replace this tensor's shape with `[values.len()]` and copy `values` in.
    ///
    /// The storage follows the [`resize`](Self::resize) rule: views sharing
    /// the storage see the new values unless the resize had to detach.
    pub fn assign_slice(&mut self, values: &[T]) -> Result<()> {
        self.resize(&[values.len()])?;
        self.with_slice_mut(|dst| dst.copy_from_slice(values))
    }

    /// Make this tensor another view of `other`'s storage and layout.
    pub fn assign(&mut self, other: &Self) {
        *self = other.clone();
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Get the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides of the tensor.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get the number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.numel
    }

    /// Extent of dimension `dim`.
    pub fn size(&self, dim: usize) -> Result<usize> {
        self.check_dim(dim)?;
        Ok(self.shape[dim])
    }

    /// Stride of dimension `dim`.
    pub fn stride(&self, dim: usize) -> Result<usize> {
        self.check_dim(dim)?;
        Ok(self.strides[dim])
    }

    /// Storage index of the first element.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Check if the strides follow the row-major layout of the shape.
    ///
    /// Strides of size-1 dimensions are ignored. The offset does not matter.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    /// Address of the first element.
    ///
    /// Two views with equal `ptr()` start at the same element. The pointer is
    /// only valid until the storage is next resized.
    pub fn ptr(&self) -> *const T {
        self.storage.borrow().as_ptr().wrapping_add(self.offset)
    }

    /// Check whether both tensors view the same storage.
    #[inline]
    pub fn shared_with(&self, other: &Self) -> bool {
        self.storage.same_as(&other.storage)
    }

    /// Number of tensors viewing this tensor's storage, this one included.
    #[inline]
    pub fn share_count(&self) -> usize {
        self.storage.share_count()
    }

    /// Handle to the underlying storage.
    #[inline]
    pub fn storage(&self) -> &SharedStorage<T> {
        &self.storage
    }

    // ========================================================================
    // Data Access
    // ========================================================================

    /// Storage index of the element at `index`.
    pub fn storage_index(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.ndim() {
            return Err(Error::CardinalityMismatch {
                op: "index",
                expected: self.ndim(),
                got: index.len(),
            });
        }

        let mut linear = self.offset;
        for ((&i, &size), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= size {
                return Err(Error::IndexOutOfBounds { index: i, size });
            }
            linear += i * stride;
        }

        let len = self.storage.len();
        if linear >= len {
            return Err(Error::StorageOutOfBounds { index: linear, len });
        }
        Ok(linear)
    }

    /// Element at `index`.
    pub fn get(&self, index: &[usize]) -> Result<T> {
        let at = self.storage_index(index)?;
        self.storage.borrow().get(at)
    }

    /// Overwrite the element at `index`. Visible through every view of the storage.
    pub fn set(&self, index: &[usize], value: T) -> Result<()> {
        let at = self.storage_index(index)?;
        self.storage.borrow_mut().set(at, value)
    }

    /// Copy all elements to a Vec in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if the storage was shrunk through another view so that this view
    /// now reaches past its end. [`copy`](Self::copy) reports that case as an
    /// error instead.
    pub fn to_vec(&self) -> Vec<T> {
        self.values().collect()
    }

    /// Run `f` on the contiguous region this tensor covers.
    ///
    /// This is the raw-buffer hand-off to external kernels. The storage stays
    /// borrowed while `f` runs, so `f` must not access other views of it.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R> {
        let (start, end) = self.contiguous_region("with_slice")?;
        let storage = self.storage.borrow();
        Ok(f(&storage.as_slice()[start..end]))
    }

    /// Run `f` on the contiguous region this tensor covers, mutably.
    ///
    /// As with [`with_slice`](Self::with_slice), `f` must not access other
    /// views of the storage.
    pub fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R> {
        let (start, end) = self.contiguous_region("with_slice_mut")?;
        let mut storage = self.storage.borrow_mut();
        Ok(f(&mut storage.as_mut_slice()[start..end]))
    }

    fn contiguous_region(&self, op: &'static str) -> Result<(usize, usize)> {
        if !self.contiguous {
            return Err(Error::NotContiguous { op });
        }
        let len = self.storage.len();
        if self.numel == 0 {
            let at = self.offset.min(len);
            return Ok((at, at));
        }
        let end = self.offset + self.numel;
        if end > len {
            return Err(Error::StorageOutOfBounds { index: end - 1, len });
        }
        Ok((self.offset, end))
    }

    /// Fail if the last element this view reaches lies past the end of the storage.
    ///
    /// A view can outlive a shrink of its storage made through another view.
    pub(crate) fn check_extent(&self) -> Result<()> {
        if self.numel == 0 {
            return Ok(());
        }
        let last = self.offset
            + self
                .shape
                .iter()
                .zip(&self.strides)
                .map(|(&size, &stride)| (size - 1) * stride)
                .sum::<usize>();
        let len = self.storage.len();
        if last >= len {
            return Err(Error::StorageOutOfBounds { index: last, len });
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn check_dim(&self, dim: usize) -> Result<()> {
        if dim >= self.ndim() {
            return Err(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            });
        }
        Ok(())
    }
}

impl<T: Scalar> Default for Tensor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> From<Vec<T>> for Tensor<T> {
    fn from(values: Vec<T>) -> Self {
        let len = values.len();
        Self::from_storage(Storage::from(values), vec![len])
    }
}

/// Compute contiguous strides for row-major (C) layout.
///
/// For shape `[m, n]`, returns strides `[n, 1]` (last dimension is contiguous).
pub fn compute_contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    let mut running = 1usize;
    for (stride, &size) in strides.iter_mut().zip(shape).rev() {
        *stride = running;
        running *= size;
    }
    strides
}

/// Row-major stride test, ignoring the strides of size-1 dimensions.
pub(crate) fn is_contiguous_layout(shape: &[usize], strides: &[usize]) -> bool {
    let mut expected = 1usize;
    for (&size, &stride) in shape.iter().zip(strides).rev() {
        if size == 1 {
            continue;
        }
        if stride != expected {
            return false;
        }
        expected *= size;
    }
    true
}

/// Check that `shape` has at least one dimension and return its element count.
///
/// Fails instead of wrapping when the count does not fit in `usize`.
pub(crate) fn validate_shape(shape: &[usize]) -> Result<usize> {
    if shape.is_empty() {
        return Err(Error::InvalidConfiguration(
            "a tensor needs at least one dimension".to_string(),
        ));
    }
    shape
        .iter()
        .try_fold(1usize, |acc, &size| acc.checked_mul(size))
        .ok_or_else(|| {
            Error::InvalidConfiguration(format!("element count of shape {shape:?} overflows"))
        })
}

impl<T: Scalar> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("contiguous", &self.contiguous)
            .field("shares", &self.share_count())
            .finish()
    }
}
