//! Elementwise operations, reductions and matrix multiplication.
//!
//! Every in-place operation writes through the tensor's view, so the change is
//! visible through every other view of the same storage. On a broadcast view
//! (zero strides) an aliased element is updated once per logical position.
//!
//! The storage is never borrowed while a user closure runs, so closures may
//! read and write other views of the same storage.

use super::Tensor;
use crate::algebra::{Scalar, Semiring};
use crate::backend::{Backend, Cpu};
use crate::error::{Error, Result};

impl<T: Scalar> Tensor<T> {
    /// Call `f` on every element in row-major order.
    pub fn for_each(&self, mut f: impl FnMut(T)) {
        for value in self.values() {
            f(value);
        }
    }

    /// Replace every element `x` with `f(x)`.
    ///
    /// Each element is read, passed to `f` and written back before the next
    /// one is read.
    pub fn apply(&self, mut f: impl FnMut(T) -> T) -> Result<()> {
        self.check_extent()?;
        for pos in self.offsets() {
            let x = self.storage.borrow().get(pos)?;
            let y = f(x);
            self.storage.borrow_mut().set(pos, y)?;
        }
        Ok(())
    }

    /// Replace every element `x` with `f(x, y)`, `y` the element of `other` at
    /// the same position.
    ///
    /// `other` is read completely before anything is written, so it may alias
    /// this tensor.
    pub fn zip_apply(&self, other: &Self, mut f: impl FnMut(T, T) -> T) -> Result<()> {
        if other.shape != self.shape {
            return Err(Error::shape_mismatch("zip_apply", &self.shape, &other.shape));
        }
        other.check_extent()?;
        self.check_extent()?;
        let rhs = other.to_vec();

        for (pos, y) in self.offsets().zip(rhs) {
            let x = self.storage.borrow().get(pos)?;
            let z = f(x, y);
            self.storage.borrow_mut().set(pos, z)?;
        }
        Ok(())
    }

    /// Write `f(&[a, b, ..])` into every position, where `a, b, ..` are the
    /// elements of `inputs` at that position.
    ///
    /// All inputs must have this tensor's shape. Inputs may alias the output.
    ///
    /// ```rust
    /// use tensorview::Tensor;
    ///
    /// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0]);
    /// let b = Tensor::from_slice(&[4.0f32, 5.0, 6.0]);
    /// let out = Tensor::<f32>::zeros(&[3]).unwrap();
    /// out.map_n(&[&a, &b], |xs| xs[0] * xs[1]).unwrap();
    /// assert_eq!(out.to_vec(), vec![4.0, 10.0, 18.0]);
    /// ```
    pub fn map_n(&self, inputs: &[&Self], mut f: impl FnMut(&[T]) -> T) -> Result<()> {
        for input in inputs {
            if input.shape != self.shape {
                return Err(Error::shape_mismatch("map_n", &self.shape, &input.shape));
            }
            input.check_extent()?;
        }
        self.check_extent()?;

        let columns: Vec<Vec<T>> = inputs.iter().map(|t| t.to_vec()).collect();
        let mut row = vec![T::zero(); columns.len()];

        for (k, pos) in self.offsets().enumerate() {
            for (slot, column) in row.iter_mut().zip(&columns) {
                *slot = column[k];
            }
            let value = f(&row);
            self.storage.borrow_mut().set(pos, value)?;
        }
        Ok(())
    }

    /// Write `values` into this tensor's positions in row-major order.
    pub(crate) fn write_values(&self, values: &[T]) -> Result<()> {
        if values.len() != self.numel {
            return Err(Error::CardinalityMismatch {
                op: "write_values",
                expected: self.numel,
                got: values.len(),
            });
        }
        self.check_extent()?;
        let mut storage = self.storage.borrow_mut();
        let data = storage.as_mut_slice();
        for (pos, &value) in self.offsets().zip(values) {
            data[pos] = value;
        }
        Ok(())
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: T) -> Result<()> {
        self.apply(|_| value)
    }

    /// Multiply every element by `alpha`.
    pub fn scale(&self, alpha: T) -> Result<()> {
        self.apply(|x| x * alpha)
    }

    /// Elementwise `self += other`.
    pub fn add_assign(&self, other: &Self) -> Result<()> {
        self.zip_apply(other, |x, y| x + y)
    }

    /// Elementwise `self += alpha * other`.
    pub fn add_scaled(&self, alpha: T, other: &Self) -> Result<()> {
        self.zip_apply(other, |x, y| x + alpha * y)
    }

    /// Sum all elements using the algebra's addition.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tensorview::Tensor;
    /// use tensorview::algebra::Standard;
    ///
    /// let t = Tensor::<f32>::from_data(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    /// let sum = t.sum::<Standard<f32>>();
    /// assert_eq!(sum, 10.0);
    /// ```
    pub fn sum<A: Semiring<Scalar = T>>(&self) -> T {
        let mut acc = A::zero();
        for val in self.values() {
            acc = acc.add(A::from_scalar(val));
        }
        acc.to_scalar()
    }

    /// Matrix product of two 2-D tensors on the [`Cpu`] backend.
    ///
    /// The result is a fresh contiguous `[m, n]` tensor.
    pub fn gemm<A: Semiring<Scalar = T>>(&self, other: &Self) -> Result<Self> {
        if self.ndim() != 2 || other.ndim() != 2 || self.shape[1] != other.shape[0] {
            return Err(Error::shape_mismatch("gemm", &self.shape, &other.shape));
        }
        let out = Self::zeros(&[self.shape[0], other.shape[1]])?;
        Cpu.gemm::<A>(self, other, &out)?;
        Ok(out)
    }
}

/// Call `f(&[a, b, ..])` for every position of the same-shaped `tensors`.
///
/// ```rust
/// use tensorview::{for_each_n, Tensor};
///
/// let a = Tensor::from_slice(&[1, 2, 3]);
/// let b = Tensor::from_slice(&[3, 2, 1]);
/// let mut dot = 0;
/// for_each_n(&[&a, &b], |xs| dot += xs[0] * xs[1]).unwrap();
/// assert_eq!(dot, 10);
/// ```
pub fn for_each_n<T: Scalar>(tensors: &[&Tensor<T>], mut f: impl FnMut(&[T])) -> Result<()> {
    let Some(first) = tensors.first() else {
        return Ok(());
    };
    for t in &tensors[1..] {
        if t.shape() != first.shape() {
            return Err(Error::shape_mismatch("for_each_n", first.shape(), t.shape()));
        }
        t.check_extent()?;
    }
    first.check_extent()?;

    let mut iters: Vec<_> = tensors.iter().map(|t| t.values()).collect();
    let mut row = vec![T::zero(); tensors.len()];
    for _ in 0..first.numel() {
        for (slot, it) in row.iter_mut().zip(iters.iter_mut()) {
            if let Some(v) = it.next() {
                *slot = v;
            }
        }
        f(&row);
    }
    Ok(())
}
