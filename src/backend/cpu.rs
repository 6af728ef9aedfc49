//! CPU backend implementation.

use std::any::{Any, TypeId};

use log::trace;

use super::Backend;
use crate::algebra::{Scalar, Semiring, Standard};
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// CPU backend: faer for standard `f32`/`f64` products, semiring loops otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cpu;

impl Backend for Cpu {
    fn name() -> &'static str {
        "cpu"
    }

    fn gemm<A: Semiring>(
        &self,
        a: &Tensor<A::Scalar>,
        b: &Tensor<A::Scalar>,
        c: &Tensor<A::Scalar>,
    ) -> Result<()> {
        if a.ndim() != 2 || b.ndim() != 2 || a.shape()[1] != b.shape()[0] {
            return Err(Error::shape_mismatch("gemm", a.shape(), b.shape()));
        }
        let m = a.shape()[0];
        let k = a.shape()[1];
        let n = b.shape()[1];
        if c.shape() != [m, n] {
            return Err(Error::shape_mismatch("gemm", &[m, n], c.shape()));
        }

        // Operands are gathered row-major before c is written
        let a_vals = a.to_vec();
        let b_vals = b.to_vec();

        let result = match faer_gemm::<A>(&a_vals, m, k, &b_vals, n) {
            Some(result) => result,
            None => {
                trace!("gemm {m}x{k}x{n}: generic semiring loop");
                generic_gemm::<A>(&a_vals, m, k, &b_vals, n)
            }
        };
        c.write_values(&result)
    }

    fn axpy<T: Scalar>(&self, alpha: T, x: &Tensor<T>, y: &Tensor<T>) -> Result<()> {
        if x.shape() != y.shape() {
            return Err(Error::shape_mismatch("axpy", y.shape(), x.shape()));
        }
        y.zip_apply(x, |yv, xv| yv + alpha * xv)
    }
}

/// Fast path: faer for `Standard<f32>` and `Standard<f64>`.
///
/// Returns `None` for any other algebra.
#[allow(clippy::ptr_arg)]
fn faer_gemm<A: Semiring>(
    a: &Vec<A::Scalar>,
    m: usize,
    k: usize,
    b: &Vec<A::Scalar>,
    n: usize,
) -> Option<Vec<A::Scalar>> {
    let result: Box<dyn Any> = if TypeId::of::<A>() == TypeId::of::<Standard<f32>>() {
        let a = (a as &dyn Any).downcast_ref::<Vec<f32>>()?;
        let b = (b as &dyn Any).downcast_ref::<Vec<f32>>()?;
        Box::new(faer_gemm_f32(a, m, k, b, n))
    } else if TypeId::of::<A>() == TypeId::of::<Standard<f64>>() {
        let a = (a as &dyn Any).downcast_ref::<Vec<f64>>()?;
        let b = (b as &dyn Any).downcast_ref::<Vec<f64>>()?;
        Box::new(faer_gemm_f64(a, m, k, b, n))
    } else {
        return None;
    };
    result.downcast::<Vec<A::Scalar>>().ok().map(|c| *c)
}

/// GEMM using faer for f32 (row-major layout).
///
/// Computes C = A @ B where A is m×k, B is k×n, C is m×n.
fn faer_gemm_f32(a: &[f32], m: usize, k: usize, b: &[f32], n: usize) -> Vec<f32> {
    use faer::Mat;

    // Row-major: element (i, j) is at index i * ncols + j
    let a_mat = Mat::from_fn(m, k, |i, j| a[i * k + j]);
    let b_mat = Mat::from_fn(k, n, |i, j| b[i * n + j]);

    let c_mat = &a_mat * &b_mat;

    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        for j in 0..n {
            c[i * n + j] = c_mat[(i, j)];
        }
    }
    c
}

/// GEMM using faer for f64 (row-major layout).
fn faer_gemm_f64(a: &[f64], m: usize, k: usize, b: &[f64], n: usize) -> Vec<f64> {
    use faer::Mat;

    let a_mat = Mat::from_fn(m, k, |i, j| a[i * k + j]);
    let b_mat = Mat::from_fn(k, n, |i, j| b[i * n + j]);

    let c_mat = &a_mat * &b_mat;

    let mut c = vec![0.0f64; m * n];
    for i in 0..m {
        for j in 0..n {
            c[i * n + j] = c_mat[(i, j)];
        }
    }
    c
}

/// Generic GEMM using semiring operations (row-major layout).
fn generic_gemm<A: Semiring>(
    a: &[A::Scalar],
    m: usize,
    k: usize,
    b: &[A::Scalar],
    n: usize,
) -> Vec<A::Scalar> {
    let mut c = vec![A::zero().to_scalar(); m * n];

    for i in 0..m {
        for j in 0..n {
            let mut acc = A::zero();
            for kk in 0..k {
                let a_val = A::from_scalar(a[i * k + kk]);
                let b_val = A::from_scalar(b[kk * n + j]);
                acc = acc.add(a_val.mul(b_val));
            }
            c[i * n + j] = acc.to_scalar();
        }
    }

    c
}
