//! Backend trait definitions.

use crate::algebra::{Scalar, Semiring};
use crate::error::Result;
use crate::tensor::Tensor;

/// Dense kernels a backend provides to tensor code.
///
/// Backends read operands through each tensor's offset, extents and strides
/// and write results back through the output tensor's view, so outputs may be
/// non-contiguous views into a larger (for example vectorized) buffer.
pub trait Backend {
    /// Backend name for debugging.
    fn name() -> &'static str;

    /// Matrix product over a semiring.
    ///
    /// Computes `c[i, j] = ⊕_k a[i, k] ⊗ b[k, j]` for 2-D `a: [m, k]`,
    /// `b: [k, n]` and `c: [m, n]`, overwriting `c`. Operands may alias `c`.
    fn gemm<A: Semiring>(
        &self,
        a: &Tensor<A::Scalar>,
        b: &Tensor<A::Scalar>,
        c: &Tensor<A::Scalar>,
    ) -> Result<()>;

    /// `y += alpha * x` for equal-shaped tensors.
    fn axpy<T: Scalar>(&self, alpha: T, x: &Tensor<T>, y: &Tensor<T>) -> Result<()>;
}
