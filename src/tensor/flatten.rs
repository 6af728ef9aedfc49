//! Merging independent tensors into one contiguous buffer.
//!
//! Both functions rewrite their inputs in place so that, afterwards, every
//! input is a view into the returned tensor's storage. This is how per-layer
//! parameter tensors become one flat vector an optimizer can update at once.
//! All inputs are validated before any of them is rewritten.

use log::{debug, trace};

use super::{compute_contiguous_strides, Tensor};
use crate::algebra::Scalar;
use crate::error::{Error, Result};
use crate::storage::{SharedStorage, Storage};

/// Flatten `tensors` into one 1-D tensor that they all view.
///
/// If the inputs already form one contiguous run of a single storage, in
/// order, the result is a view of that run and nothing is copied. Otherwise a
/// fresh buffer is allocated, each input's values are copied into its slice
/// of it, and each input is rewritten as a same-shaped view of that slice.
///
/// An empty list yields an empty tensor.
///
/// ```rust
/// use tensorview::{vectorize, Tensor};
///
/// let mut w = Tensor::<f32>::from_data(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// let mut b = Tensor::<f32>::from_slice(&[5.0, 6.0]);
/// let flat = vectorize(&mut [&mut w, &mut b]).unwrap();
///
/// assert_eq!(flat.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// flat.set(&[4], 50.0).unwrap();
/// assert_eq!(b.get(&[0]).unwrap(), 50.0);
///
/// // Already flat: the second call is zero-copy.
/// let again = vectorize(&mut [&mut w, &mut b]).unwrap();
/// assert_eq!(again.ptr(), flat.ptr());
/// ```
pub fn vectorize<T: Scalar>(tensors: &mut [&mut Tensor<T>]) -> Result<Tensor<T>> {
    let Some(first) = tensors.first() else {
        return Ok(Tensor::new());
    };
    for t in tensors.iter() {
        t.check_extent()?;
    }

    let total: usize = tensors.iter().map(|t| t.numel()).sum();

    if is_flat_run(tensors) {
        trace!(
            "vectorize: {} tensors already contiguous in one storage ({} elements)",
            tensors.len(),
            total
        );
        return Ok(Tensor::from_parts(
            first.storage.clone(),
            vec![total],
            vec![1],
            first.offset,
        ));
    }

    debug!(
        "vectorize: copying {} tensors into a fresh buffer of {} elements",
        tensors.len(),
        total
    );
    let mut data = Vec::with_capacity(total);
    for t in tensors.iter() {
        data.extend(t.values());
    }
    let storage = SharedStorage::new(Storage::from(data));

    let mut offset = 0;
    for t in tensors.iter_mut() {
        let shape = t.shape.clone();
        let strides = compute_contiguous_strides(&shape);
        let numel = t.numel;
        t.storage = storage.clone();
        t.set_layout(shape, strides, offset);
        offset += numel;
    }

    Ok(Tensor::from_parts(storage, vec![total], vec![1], 0))
}

/// Whether every tensor is contiguous and starts where the previous one ends,
/// all in the same storage.
fn is_flat_run<T: Scalar>(tensors: &[&mut Tensor<T>]) -> bool {
    tensors.iter().all(|t| t.is_contiguous())
        && tensors.windows(2).all(|pair| {
            pair[0].shared_with(&pair[1]) && pair[0].offset + pair[0].numel == pair[1].offset
        })
}

/// Join `tensors` along `dim` into a fresh tensor that they all view.
///
/// Every input must match the first one in rank and in every extent except
/// `dim`. Each input is rewritten as the narrowed slice of the result holding
/// its values. An empty list yields an empty tensor.
///
/// ```rust
/// use tensorview::{concatenate, Tensor};
///
/// let mut a = Tensor::<i32>::from_data(&[1, 2, 3, 4], &[2, 2]).unwrap();
/// let mut b = Tensor::<i32>::from_data(&[5, 6], &[2, 1]).unwrap();
/// let joined = concatenate(&mut [&mut a, &mut b], 1).unwrap();
///
/// assert_eq!(joined.shape(), &[2, 3]);
/// assert_eq!(joined.to_vec(), vec![1, 2, 5, 3, 4, 6]);
/// assert!(b.shared_with(&joined));
/// ```
pub fn concatenate<T: Scalar>(tensors: &mut [&mut Tensor<T>], dim: usize) -> Result<Tensor<T>> {
    let Some(first) = tensors.first() else {
        return Ok(Tensor::new());
    };
    first.check_dim(dim)?;

    let mut shape = first.shape.clone();
    let mut joined = 0;
    for t in tensors.iter() {
        let compatible = t.ndim() == shape.len()
            && t
                .shape
                .iter()
                .zip(&shape)
                .enumerate()
                .all(|(d, (a, b))| d == dim || a == b);
        if !compatible {
            return Err(Error::shape_mismatch("concatenate", &shape, &t.shape));
        }
        t.check_extent()?;
        joined += t.shape[dim];
    }
    shape[dim] = joined;

    debug!(
        "concatenate: joining {} tensors along dim {} into {:?}",
        tensors.len(),
        dim,
        shape
    );
    let result = Tensor::zeros(&shape)?;

    let mut start = 0;
    for t in tensors.iter_mut() {
        let len = t.shape[dim];
        let slot = result.narrow(dim, start, len)?;
        slot.copy_from(&**t)?;
        **t = slot;
        start += len;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectorize_4_and_2() {
        let mut a = Tensor::from_slice(&[0.0f64, 1.0, 2.0, 3.0]);
        let mut b = Tensor::from_slice(&[4.0f64, 5.0]);
        let flat = vectorize(&mut [&mut a, &mut b]).unwrap();

        assert_eq!(flat.shape(), &[6]);
        assert_eq!(flat.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(a.shared_with(&flat) && b.shared_with(&flat));
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 4);
        assert_eq!(b.ptr(), a.ptr().wrapping_add(4));
    }

    #[test]
    fn test_vectorize_rewrites_strided_inputs() {
        let base = Tensor::<i32>::from_data(&[1, 2, 3, 4], &[2, 2]).unwrap();
        let mut t = base.transpose(0, 1).unwrap();
        let flat = vectorize(&mut [&mut t]).unwrap();

        assert_eq!(flat.to_vec(), vec![1, 3, 2, 4]);
        assert!(t.is_contiguous());
        assert_eq!(t.shape(), &[2, 2]);
        assert!(!t.shared_with(&base));
    }

    #[test]
    fn test_vectorize_zero_copy_run() {
        let whole = Tensor::<f32>::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut a = whole.narrow(0, 0, 2).unwrap();
        let mut b = whole.narrow(0, 2, 3).unwrap().view(&[3, 1]).unwrap();
        let flat = vectorize(&mut [&mut a, &mut b]).unwrap();
        assert!(flat.shared_with(&whole));
        assert_eq!(flat.ptr(), whole.ptr());
        assert_eq!(b.shape(), &[3, 1]);
    }

    #[test]
    fn test_vectorize_out_of_order_copies() {
        let whole = Tensor::<f32>::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let mut a = whole.narrow(0, 2, 2).unwrap();
        let mut b = whole.narrow(0, 0, 2).unwrap();
        let flat = vectorize(&mut [&mut a, &mut b]).unwrap();
        assert!(!flat.shared_with(&whole));
        assert_eq!(flat.to_vec(), vec![3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_vectorize_empty() {
        let flat = vectorize::<f64>(&mut []).unwrap();
        assert_eq!(flat.numel(), 0);
    }

    #[test]
    fn test_concatenate_dim0() {
        let mut a = Tensor::<i64>::from_data(&[1, 2, 3], &[1, 3]).unwrap();
        let mut b = Tensor::<i64>::from_data(&[4, 5, 6, 7, 8, 9], &[2, 3]).unwrap();
        let c = concatenate(&mut [&mut a, &mut b], 0).unwrap();
        assert_eq!(c.shape(), &[3, 3]);
        assert_eq!(c.to_vec(), (1..=9).collect::<Vec<_>>());

        c.set(&[2, 2], 0).unwrap();
        assert_eq!(b.get(&[1, 2]).unwrap(), 0);
    }

    #[test]
    fn test_concatenate_mismatch_leaves_inputs() {
        let mut a = Tensor::<f32>::zeros(&[2, 3]).unwrap();
        let mut b = Tensor::<f32>::zeros(&[3, 2]).unwrap();
        let a_before = a.clone();
        let err = concatenate(&mut [&mut a, &mut b], 0).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { op: "concatenate", .. }));
        assert!(a.shared_with(&a_before));
        assert!(matches!(
            concatenate(&mut [&mut a], 2),
            Err(Error::InvalidDimension { dim: 2, ndim: 2 })
        ));
    }

    #[test]
    fn test_concatenate_empty() {
        let c = concatenate::<u32>(&mut [], 0).unwrap();
        assert_eq!(c.numel(), 0);
    }
}
