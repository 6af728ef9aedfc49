//! Row-major traversal of tensor elements.
//!
//! [`TensorIter`] is a cursor over storage positions. It runs in one of two
//! modes picked from the tensor's contiguity when it is created:
//!
//! - contiguous: a bare storage index, advanced by one
//! - strided: a storage index plus one counter per dimension, advanced like
//!   an odometer with the last dimension fastest
//!
//! [`Offsets`] and [`Values`] wrap the cursor as standard iterators.

use std::iter::FusedIterator;

use super::Tensor;
use crate::algebra::Scalar;
use crate::storage::SharedStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Contiguous,
    Strided { counter: Vec<usize> },
}

/// Cursor over the storage positions of a tensor, in row-major order.
///
/// Two cursors compare equal when they are at the same logical position. In
/// strided mode that compares the counters, not the storage index, since
/// distinct positions can share an index when strides are zero.
///
/// ```rust
/// use tensorview::Tensor;
///
/// let t = Tensor::<i32>::from_data(&[1, 2, 3, 4], &[2, 2]).unwrap();
/// let t = t.transpose(0, 1).unwrap();
///
/// let mut visited = Vec::new();
/// let mut it = t.begin();
/// while it != t.end() {
///     visited.push(it.position());
///     it.advance();
/// }
/// assert_eq!(visited, vec![0, 2, 1, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct TensorIter<'a> {
    shape: &'a [usize],
    strides: &'a [usize],
    pos: usize,
    mode: Mode,
}

impl<'a> TensorIter<'a> {
    fn begin<T: Scalar>(tensor: &'a Tensor<T>) -> Self {
        if tensor.numel() == 0 {
            return Self::end(tensor);
        }
        let mode = if tensor.is_contiguous() {
            Mode::Contiguous
        } else {
            Mode::Strided {
                counter: vec![0; tensor.ndim()],
            }
        };
        Self {
            shape: tensor.shape(),
            strides: tensor.strides(),
            pos: tensor.offset(),
            mode,
        }
    }

    fn end<T: Scalar>(tensor: &'a Tensor<T>) -> Self {
        let shape = tensor.shape();
        let strides = tensor.strides();
        if tensor.is_contiguous() {
            return Self {
                shape,
                strides,
                pos: tensor.offset() + tensor.numel(),
                mode: Mode::Contiguous,
            };
        }

        let mut counter = vec![0; shape.len()];
        counter[0] = shape[0];
        Self {
            shape,
            strides,
            pos: tensor.offset() + shape[0] * strides[0],
            mode: Mode::Strided { counter },
        }
    }

    /// Storage index of the current element.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Per-dimension index of the current element, in strided mode.
    pub fn counter(&self) -> Option<&[usize]> {
        match &self.mode {
            Mode::Contiguous => None,
            Mode::Strided { counter } => Some(counter),
        }
    }

    /// Step to the next element in row-major order.
    ///
    /// Advancing past the last element lands on the end position.
    pub fn advance(&mut self) {
        match &mut self.mode {
            Mode::Contiguous => self.pos += 1,
            Mode::Strided { counter } => {
                let mut d = counter.len() - 1;
                counter[d] += 1;
                self.pos += self.strides[d];
                while d > 0 && counter[d] == self.shape[d] {
                    self.pos -= self.shape[d] * self.strides[d];
                    counter[d] = 0;
                    d -= 1;
                    counter[d] += 1;
                    self.pos += self.strides[d];
                }
            }
        }
    }
}

impl PartialEq for TensorIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.mode, &other.mode) {
            (Mode::Contiguous, Mode::Contiguous) => self.pos == other.pos,
            (Mode::Strided { counter: a }, Mode::Strided { counter: b }) => a == b,
            _ => false,
        }
    }
}

impl Eq for TensorIter<'_> {}

/// Iterator over the storage indices of a tensor's elements.
#[derive(Debug, Clone)]
pub struct Offsets<'a> {
    cursor: TensorIter<'a>,
    remaining: usize,
}

impl Iterator for Offsets<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.cursor.position();
        self.cursor.advance();
        self.remaining -= 1;
        Some(pos)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Offsets<'_> {}

impl FusedIterator for Offsets<'_> {}

/// Iterator over a tensor's element values, in row-major order.
///
/// The storage is borrowed only while each value is read, so the loop body
/// may write through other views of it. Such writes are seen by later steps.
#[derive(Debug, Clone)]
pub struct Values<'a, T: Scalar> {
    storage: &'a SharedStorage<T>,
    offsets: Offsets<'a>,
}

impl<T: Scalar> Iterator for Values<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        let pos = self.offsets.next()?;
        Some(self.storage.borrow().as_slice()[pos])
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<T: Scalar> ExactSizeIterator for Values<'_, T> {}

impl<T: Scalar> FusedIterator for Values<'_, T> {}

impl<T: Scalar> Tensor<T> {
    /// Cursor at the first element.
    pub fn begin(&self) -> TensorIter<'_> {
        TensorIter::begin(self)
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> TensorIter<'_> {
        TensorIter::end(self)
    }

    /// Storage indices of all elements in row-major order.
    pub fn offsets(&self) -> Offsets<'_> {
        Offsets {
            cursor: self.begin(),
            remaining: self.numel(),
        }
    }

    /// Element values in row-major order.
    ///
    /// # Panics
    ///
    /// Panics on a step that finds the storage shrunk (through another view)
    /// below the position it reads.
    pub fn values(&self) -> Values<'_, T> {
        Values {
            storage: &self.storage,
            offsets: self.offsets(),
        }
    }
}

impl<'a, T: Scalar> IntoIterator for &'a Tensor<T> {
    type Item = T;
    type IntoIter = Values<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}
