//! Core algebraic trait for tensor reductions.

use super::Scalar;

/// A semiring defines two binary operations (⊕, ⊗) with identities.
///
/// # Semiring Laws
///
/// For a semiring (S, ⊕, ⊗, 0, 1):
/// - (S, ⊕, 0) is a commutative monoid
/// - (S, ⊗, 1) is a monoid
/// - ⊗ distributes over ⊕
/// - 0 annihilates: a ⊗ 0 = 0 ⊗ a = 0
///
/// # Examples
///
/// | Semiring | ⊕ | ⊗ | 0 | 1 |
/// |----------|---|---|---|---|
/// | Standard | + | × | 0 | 1 |
pub trait Semiring: Copy + Clone + 'static {
    /// The underlying scalar type
    type Scalar: Scalar;

    /// Additive identity (zero element for ⊕)
    fn zero() -> Self;

    /// Multiplicative identity (one element for ⊗)
    fn one() -> Self;

    /// Addition operation (⊕)
    fn add(self, rhs: Self) -> Self;

    /// Multiplication operation (⊗)
    fn mul(self, rhs: Self) -> Self;

    /// Create from scalar value
    fn from_scalar(s: Self::Scalar) -> Self;

    /// Extract scalar value
    fn to_scalar(self) -> Self::Scalar;

    /// Check if this is the zero element
    fn is_zero(&self) -> bool;
}
