//! Operations in the secp256k1 group.
//!
//! This module holds the multiplications and additions that can be done with [`Point`]s and
//! [`Scalar`]s. The arithmetic operators on those types call into here.
//!
//! [`mul_base`] and [`scalar_mul_point`] run in constant time and may be given secret scalars.
//! [`double_mul`] and [`lincomb`] branch on their inputs and are meant for verification where every
//! input is public.
//!
//! ```
//! use kfun::{G, Scalar, op};
//! let x = Scalar::random(&mut rand::thread_rng());
//! let X1 = op::mul_base(&x); // uses the precomputed generator table
//! let X2 = op::scalar_mul_point(&x, G);
//! assert_eq!(X1, X2);
//! ```
use crate::{
    Point, Scalar,
    backend::{self, ECMultContext, ECMultGenContext, GroupElement, GroupElementJacobian},
    marker::*,
};
use alloc::vec::Vec;

/// Computes `x * G` in constant time using the precomputed generator table.
pub fn mul_base<Z>(x: &Scalar<Z>) -> Point<Z> {
    Point::from_jacobian(&ECMultGenContext::get().mul(&x.0))
}

/// Multiplies the point `P` by the scalar `x` in constant time.
pub fn scalar_mul_point<Z1, Z2>(x: &Scalar<Z1>, P: &Point<Z2>) -> Point<Z1::Out>
where
    Z1: DecideZero<Z2>,
{
    // which point is being multiplied is public so branching on it is fine
    let product = if is_generator(&P.0) {
        ECMultGenContext::get().mul(&x.0)
    } else {
        backend::mul_const_time(&x.0, &P.0.to_jacobian())
    };
    Point::from_jacobian(&product)
}

/// Computes `x * A + y * B` faster than two separate multiplications.
///
/// This runs in variable time so the scalars must not be secret.
pub fn double_mul<ZX, ZA, ZY, ZB>(
    x: &Scalar<ZX>,
    A: &Point<ZA>,
    y: &Scalar<ZY>,
    B: &Point<ZB>,
) -> Point<Zero> {
    lincomb([x.mark_zero(), y.mark_zero()].iter(), [A.mark_zero(), B.mark_zero()].iter())
}

/// Computes `x * G + y * B` with the generator's wider precomputed table.
///
/// This runs in variable time so the scalars must not be secret.
pub fn g_double_mul<ZX, ZY, ZB>(x: &Scalar<ZX>, y: &Scalar<ZY>, B: &Point<ZB>) -> Point<Zero> {
    let B = B.0.to_jacobian();
    Point::from_jacobian(&ECMultContext::get().double_mul(&x.0, &y.0, &B))
}

/// Computes the linear combination `Σ scalar_i * point_i` with Strauss' method.
///
/// Terms whose point is [`G`] are folded into one multiplication with the generator table. The
/// iterators are zipped so any excess elements of the longer one are ignored.
///
/// This runs in variable time so the scalars must not be secret.
///
/// [`G`]: crate::G
pub fn lincomb<'a, Z1: 'a, Z2: 'a>(
    scalars: impl IntoIterator<Item = &'a Scalar<Z1>>,
    points: impl IntoIterator<Item = &'a Point<Z2>>,
) -> Point<Zero> {
    let mut g_scalar: Option<backend::Scalar> = None;
    let mut terms: Vec<(backend::Scalar, GroupElementJacobian)> = Vec::new();
    for (scalar, point) in scalars.into_iter().zip(points) {
        if is_generator(&point.0) {
            g_scalar = Some(match g_scalar {
                Some(acc) => acc.add(&scalar.0),
                None => scalar.0,
            });
        } else {
            terms.push((scalar.0, point.0.to_jacobian()));
        }
    }
    let result = ECMultContext::get().multi_mul(
        g_scalar.as_ref(),
        terms.iter().map(|(scalar, point)| (scalar, point)),
    );
    Point::from_jacobian(&result)
}

/// Adds two points together.
pub fn point_add<Z1, Z2>(A: &Point<Z1>, B: &Point<Z2>) -> Point<Zero> {
    Point::from_jacobian(&A.0.to_jacobian().add_affine(&B.0))
}

/// Subtracts one point from another.
pub fn point_sub<Z1, Z2>(A: &Point<Z1>, B: &Point<Z2>) -> Point<Zero> {
    Point::from_jacobian(&A.0.to_jacobian().add_affine(&B.0.negate()))
}

fn is_generator(point: &GroupElement) -> bool {
    *point == GroupElement::GENERATOR
}
