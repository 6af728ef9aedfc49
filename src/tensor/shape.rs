//! Shape algorithms: resizing, zero-copy views and copies.

use log::debug;

use super::{compute_contiguous_strides, validate_shape, Tensor};
use crate::algebra::Scalar;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Per-dimension selector for [`Tensor::sub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubRange {
    /// Keep the whole dimension.
    All,
    /// Fix the dimension at one index and drop it.
    Index(usize),
    /// Keep `len` entries starting at `start`.
    Range {
        /// First kept index
        start: usize,
        /// Number of kept entries
        len: usize,
    },
}

impl<T: Scalar> Tensor<T> {
    /// Set the shape to `new_shape` with row-major strides.
    ///
    /// The storage connection survives unless it cannot: a view that is not
    /// contiguous, or one that grows while its storage is shared, first gets a
    /// private contiguous copy. A sole owner resizes its storage in place; a
    /// shared contiguous view that does not grow is only re-described.
    ///
    /// Values that stay in range keep their row-major positions.
    pub fn resize(&mut self, new_shape: &[usize]) -> Result<()> {
        let new_numel = validate_shape(new_shape)?;
        let shared = !self.storage.is_unique();

        if !self.contiguous || (shared && new_numel > self.numel) {
            debug!(
                "resize {:?} -> {:?}: detaching (shares={}, contiguous={})",
                self.shape,
                new_shape,
                self.share_count(),
                self.contiguous
            );
            let private = self.copy()?;
            private
                .storage
                .borrow_mut()
                .resize(new_numel, T::zero());
            self.storage = private.storage;
            self.offset = 0;
        } else if !shared {
            self.storage
                .borrow_mut()
                .resize(self.offset + new_numel, T::zero());
        }

        let strides = compute_contiguous_strides(new_shape);
        self.set_layout(new_shape.to_vec(), strides, self.offset);
        Ok(())
    }

    /// Describe the same storage with a different shape.
    ///
    /// Requires a contiguous tensor and at most as many elements as it has.
    pub fn view(&self, new_shape: &[usize]) -> Result<Self> {
        let new_numel = validate_shape(new_shape)?;
        if !self.contiguous {
            return Err(Error::NotContiguous { op: "view" });
        }
        if new_numel > self.numel {
            return Err(Error::CardinalityMismatch {
                op: "view",
                expected: self.numel,
                got: new_numel,
            });
        }

        Ok(Self::from_parts(
            self.storage.clone(),
            new_shape.to_vec(),
            compute_contiguous_strides(new_shape),
            self.offset,
        ))
    }

    /// One-dimensional view of all elements.
    pub fn flatten(&self) -> Result<Self> {
        self.view(&[self.numel])
    }

    /// Copy the values into a new tensor of shape `new_shape`.
    ///
    /// Never shares storage with `self`.
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Self> {
        let new_numel = validate_shape(new_shape)?;
        if new_numel != self.numel {
            return Err(Error::CardinalityMismatch {
                op: "reshape",
                expected: self.numel,
                got: new_numel,
            });
        }
        self.check_extent()?;
        Ok(Self::from_storage(
            Storage::from(self.to_vec()),
            new_shape.to_vec(),
        ))
    }

    /// Fix dimension `dim` at `index` and drop it.
    ///
    /// Selecting from a one-dimensional tensor gives shape `[1]`.
    pub fn select(&self, dim: usize, index: usize) -> Result<Self> {
        self.check_dim(dim)?;
        let size = self.shape[dim];
        if index >= size {
            return Err(Error::IndexOutOfBounds { index, size });
        }

        let offset = self.offset + index * self.strides[dim];
        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.remove(dim);
        strides.remove(dim);
        if shape.is_empty() {
            shape.push(1);
            strides.push(1);
        }
        Ok(Self::from_parts(self.storage.clone(), shape, strides, offset))
    }

    /// Restrict dimension `dim` to `[index, index + length)`.
    pub fn narrow(&self, dim: usize, index: usize, length: usize) -> Result<Self> {
        self.check_dim(dim)?;
        let size = self.shape[dim];
        let end = index.saturating_add(length);
        if end > size {
            return Err(Error::IndexOutOfBounds { index: end, size });
        }

        let mut shape = self.shape.clone();
        shape[dim] = length;
        Ok(Self::from_parts(
            self.storage.clone(),
            shape,
            self.strides.clone(),
            self.offset + index * self.strides[dim],
        ))
    }

    /// Broadcast the size-1 dimension `dim` to `size` with a zero stride.
    ///
    /// Every position along `dim` aliases the same element.
    pub fn expand(&self, dim: usize, size: usize) -> Result<Self> {
        self.check_dim(dim)?;
        if self.shape[dim] != 1 {
            return Err(Error::ExpandNonSingleton {
                dim,
                size: self.shape[dim],
            });
        }

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape[dim] = size;
        strides[dim] = 0;
        validate_shape(&shape)?;
        Ok(Self::from_parts(
            self.storage.clone(),
            shape,
            strides,
            self.offset,
        ))
    }

    /// Apply one [`SubRange`] per dimension at once.
    ///
    /// Dimensions fixed with [`SubRange::Index`] are dropped. If every
    /// dimension is dropped the result has shape `[1]`.
    pub fn sub(&self, ranges: &[SubRange]) -> Result<Self> {
        if ranges.len() != self.ndim() {
            return Err(Error::CardinalityMismatch {
                op: "sub",
                expected: self.ndim(),
                got: ranges.len(),
            });
        }

        let mut offset = self.offset;
        let mut shape = Vec::with_capacity(ranges.len());
        let mut strides = Vec::with_capacity(ranges.len());
        for ((range, &size), &stride) in ranges.iter().zip(&self.shape).zip(&self.strides) {
            match *range {
                SubRange::All => {
                    shape.push(size);
                    strides.push(stride);
                }
                SubRange::Index(index) => {
                    if index >= size {
                        return Err(Error::IndexOutOfBounds { index, size });
                    }
                    offset += index * stride;
                }
                SubRange::Range { start, len } => {
                    let end = start.saturating_add(len);
                    if end > size {
                        return Err(Error::IndexOutOfBounds { index: end, size });
                    }
                    offset += start * stride;
                    shape.push(len);
                    strides.push(stride);
                }
            }
        }
        if shape.is_empty() {
            shape.push(1);
            strides.push(1);
        }
        Ok(Self::from_parts(self.storage.clone(), shape, strides, offset))
    }

    /// Swap two dimensions (zero-copy).
    pub fn transpose(&self, dim1: usize, dim2: usize) -> Result<Self> {
        self.check_dim(dim1)?;
        self.check_dim(dim2)?;

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.swap(dim1, dim2);
        strides.swap(dim1, dim2);
        Ok(Self::from_parts(
            self.storage.clone(),
            shape,
            strides,
            self.offset,
        ))
    }

    /// Reorder all dimensions (zero-copy).
    ///
    /// # Example
    ///
    /// ```rust
    /// use tensorview::Tensor;
    ///
    /// let a = Tensor::<f64>::zeros(&[2, 3, 4]).unwrap();
    /// let p = a.permute(&[2, 0, 1]).unwrap();
    /// assert_eq!(p.shape(), &[4, 2, 3]);
    /// assert_eq!(p.strides(), &[1, 12, 4]);
    /// ```
    pub fn permute(&self, axes: &[usize]) -> Result<Self> {
        if axes.len() != self.ndim() {
            return Err(Error::CardinalityMismatch {
                op: "permute",
                expected: self.ndim(),
                got: axes.len(),
            });
        }

        // Check axes are valid and unique
        let mut seen = vec![false; self.ndim()];
        for &ax in axes {
            self.check_dim(ax)?;
            if seen[ax] {
                return Err(Error::InvalidConfiguration(format!(
                    "duplicate axis {ax} in permutation {axes:?}"
                )));
            }
            seen[ax] = true;
        }

        let shape: Vec<usize> = axes.iter().map(|&i| self.shape[i]).collect();
        let strides: Vec<usize> = axes.iter().map(|&i| self.strides[i]).collect();
        Ok(Self::from_parts(
            self.storage.clone(),
            shape,
            strides,
            self.offset,
        ))
    }

    /// Make tensor contiguous in memory.
    ///
    /// If already contiguous, returns another view of the same storage.
    /// Otherwise, copies data to a new contiguous buffer.
    pub fn contiguous(&self) -> Result<Self> {
        if self.contiguous {
            Ok(self.clone())
        } else {
            self.copy()
        }
    }

    /// Deep copy with the same shape into fresh contiguous storage.
    ///
    /// Fails with [`Error::StorageOutOfBounds`] if the storage was shrunk
    /// through another view so that this view reaches past its end.
    pub fn copy(&self) -> Result<Self> {
        self.check_extent()?;
        Ok(Self::from_storage(
            Storage::from(self.to_vec()),
            self.shape.clone(),
        ))
    }

    /// Copy `other`'s values, in row-major order, into this tensor's positions.
    ///
    /// This tensor keeps its own shape; only the element counts must match.
    pub fn copy_from(&self, other: &Self) -> Result<()> {
        if other.numel != self.numel {
            return Err(Error::shape_mismatch("copy_from", &self.shape, &other.shape));
        }
        other.check_extent()?;
        let values = other.to_vec();
        self.write_values(&values)
    }

    /// Exchange element values with an equal-shaped tensor.
    ///
    /// Both tensors keep their storage; only values move.
    pub fn swap(&self, other: &Self) -> Result<()> {
        if other.shape != self.shape {
            return Err(Error::shape_mismatch("swap", &self.shape, &other.shape));
        }
        self.check_extent()?;
        other.check_extent()?;
        let mine = self.to_vec();
        let theirs = other.to_vec();
        self.write_values(&theirs)?;
        other.write_values(&mine)
    }
}
