//! Standard arithmetic semiring `(+, ×)`.

use super::semiring::Semiring;
use super::Scalar;

/// Standard arithmetic semiring with addition and multiplication.
///
/// # Example
///
/// ```rust
/// use tensorview::algebra::{Semiring, Standard};
///
/// let a = Standard(2.0f32);
/// let b = Standard(3.0f32);
///
/// assert_eq!(a.add(b).to_scalar(), 5.0);
/// assert_eq!(a.mul(b).to_scalar(), 6.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Standard<T: Scalar>(pub T);

impl<T: Scalar> Semiring for Standard<T> {
    type Scalar = T;

    #[inline]
    fn zero() -> Self {
        Standard(T::zero())
    }

    #[inline]
    fn one() -> Self {
        Standard(T::one())
    }

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Standard(self.0 + rhs.0)
    }

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Standard(self.0 * rhs.0)
    }

    #[inline]
    fn from_scalar(s: T) -> Self {
        Standard(s)
    }

    #[inline]
    fn to_scalar(self) -> T {
        self.0
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}
