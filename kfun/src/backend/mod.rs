//! The arithmetic underneath [`Scalar`] and [`Point`].
//!
//! These types carry no invariants beyond being valid field, scalar and group values. Most users
//! want the marker-typed wrappers at the crate root instead.
//!
//! [`Scalar`]: crate::Scalar
//! [`Point`]: crate::Point
mod ecmult;
mod field;
mod group;
mod scalar;

pub use ecmult::{ECMultContext, ECMultGenContext, mul_const_time};
pub use field::{FieldElement, batch_invert};
pub use group::{GroupElement, GroupElementJacobian};
pub use scalar::Scalar;
