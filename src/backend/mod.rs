//! Backend abstractions for dense kernels.
//!
//! This module defines the [`Backend`] trait, the narrow boundary through
//! which external algebra kernels read and write tensors, and its
//! implementation:
//! - [`Cpu`]: CPU backend, faer-accelerated for standard `f32`/`f64` products

mod cpu;
mod traits;

pub use cpu::Cpu;
pub use traits::Backend;
