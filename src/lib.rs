//! # tensorview
//!
//! Strided tensor views over shared, reference-counted storage.
//!
//! ## Features
//!
//! - **Zero-copy views**: `view`, `select`, `narrow`, `expand`, `sub`, `transpose`, `permute`
//! - **Explicit sharing**: every view of a storage sees every write; `copy` and `resize` detach
//! - **Strided iteration**: row-major traversal of any stride pattern, including broadcasts
//! - **Parameter flattening**: [`vectorize`] and [`concatenate`] re-merge independent tensors
//!   into one contiguous buffer that all of them keep viewing
//! - **Algebra-agnostic kernels**: [`Backend`] GEMM over any [`Semiring`], faer-accelerated on CPU
//! - **Serialization**: save/restore through a generic [`Node`], with `serde` support
//!
//! ## Quick Start
//!
//! ```rust
//! use tensorview::{vectorize, Tensor};
//!
//! // Two independently allocated parameter tensors
//! let mut weight = Tensor::<f32>::from_data(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//! let mut bias = Tensor::<f32>::from_slice(&[0.5, 0.5]);
//!
//! // One flat vector that both now view
//! let params = vectorize(&mut [&mut weight, &mut bias]).unwrap();
//! params.scale(2.0).unwrap();
//!
//! assert_eq!(weight.to_vec(), vec![2.0, 4.0, 6.0, 8.0]);
//! assert_eq!(bias.to_vec(), vec![1.0, 1.0]);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Tensor<T> (view)                        │
//! │   shape / strides / offset, cached numel + contiguity       │
//! │   views, copies, TensorIter, elementwise ops                │
//! └─────────────────────────────────────────────────────────────┘
//!                               │ shares
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          SharedStorage<T>  =  Rc<RefCell<Storage<T>>>       │
//! │   vectorize / concatenate re-point many views at one        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Backend (gemm / axpy)                       │
//! │   Standard<f32|f64>: faer                                   │
//! │   other semirings: generic loops                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded: tensors are neither `Send` nor `Sync`.

pub mod algebra;
pub mod backend;
pub mod error;
pub mod node;
pub mod storage;
pub mod tensor;

// Re-exports
pub use algebra::{Scalar, Semiring, Standard};
pub use backend::{Backend, Cpu};
pub use error::{Error, Result};
pub use node::Node;
pub use storage::{SharedStorage, Storage};
pub use tensor::{concatenate, for_each_n, vectorize, SubRange, Tensor, TensorIter};

