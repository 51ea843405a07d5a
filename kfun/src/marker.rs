//! Markers for improved compile time safety.
//!
//! [`Scalar`]s and [`Point`]s carry a [`ZeroChoice`] marker. Values marked [`NonZero`] are
//! guaranteed not to be zero (or the point at infinity) so operations like inversion can't be called
//! on something that would make them undefined.
//!
//! [`Scalar`]: crate::Scalar
//! [`Point`]: crate::Point

/// Something marked with Zero might be `0` i.e. the additive identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Zero;

/// Something marked with `NonZero` is guaranteed not to be 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NonZero;

/// A marker trait over [`Zero`] and [`NonZero`].
pub trait ZeroChoice: Default + Clone + Copy + PartialEq + Eq + core::fmt::Debug + 'static {
    /// Returns whether the type is `Zero`
    fn is_zero() -> bool;
}

impl ZeroChoice for Zero {
    fn is_zero() -> bool {
        true
    }
}

impl ZeroChoice for NonZero {
    fn is_zero() -> bool {
        false
    }
}

/// Decides the zero marker of a product: it is only `NonZero` if both sides are.
pub trait DecideZero<ZZ> {
    /// The resulting marker.
    type Out: ZeroChoice;
}

impl<Z: ZeroChoice> DecideZero<Z> for Zero {
    type Out = Zero;
}

impl<Z: ZeroChoice> DecideZero<Z> for NonZero {
    type Out = Z;
}
