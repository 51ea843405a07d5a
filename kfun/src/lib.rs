//! secp256k1 for the kfun signature crates.
//!
//! This crate holds the arithmetic the [`kfun_ecdsa`] and [`kfun_schnorr`] crates are built from:
//!
//! - [`Scalar`]s modulo the curve order and [`Point`]s on the curve. Both carry a [`marker`] saying
//!   whether they can be zero, so division by zero or signing with the point at infinity is a
//!   compile-time error rather than a runtime surprise.
//! - [`XOnly`] public keys for BIP340, validated when they are parsed.
//! - [`ECPrivKey`] and key pairs.
//! - [`nonce`] functions for deterministic and synthetic nonce derivation.
//! - [`dleq`] proofs that two points share a discrete log.
//!
//! ```
//! use kfun::{G, Point, Scalar, op};
//! let x = Scalar::random(&mut rand::thread_rng());
//! let X = op::mul_base(&x);
//! let Y = Point::random(&mut rand::thread_rng());
//! // x*G + x*Y == x*(G + Y)
//! let lhs = op::double_mul(&x, G, &x, &Y);
//! let rhs = op::scalar_mul_point(&x, &(*G + Y).non_zero().unwrap());
//! assert_eq!(lhs, rhs);
//! assert_eq!(X, &x * G);
//! ```
//!
//! [`kfun_ecdsa`]: https://docs.rs/kfun_ecdsa
//! [`kfun_schnorr`]: https://docs.rs/kfun_schnorr
#![no_std]
#![allow(non_snake_case)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod dleq;
pub mod hash;
pub mod hex;
pub mod keys;
pub mod nonce;

pub use digest;
pub use rand_core;

mod error;
mod point;
mod scalar;
mod xonly;

mod backend;
pub mod marker;
pub mod op;

#[doc(hidden)]
pub mod macros;
pub use error::Error;
pub use keys::{ECPrivKey, KeyPair, XOnlyKeyPair};
pub use point::Point;
pub use scalar::Scalar;
pub use xonly::XOnly;

#[cfg(feature = "serde")]
pub extern crate serde;

#[cfg(feature = "proptest")]
mod proptest_impls;

#[cfg(feature = "libsecp_compat_0_30")]
mod libsecp_compat;
#[cfg(feature = "libsecp_compat_0_30")]
pub extern crate secp256k1_0_30;
#[cfg(feature = "libsecp_compat")]
pub use secp256k1_0_30 as secp256k1;

/// The main basepoint for secp256k1 as specified in [_SEC 2: Recommended Elliptic Curve Domain Parameters_] and used in Bitcoin.
///
/// ```
/// use kfun::G;
/// assert_eq!(
///     format!("{}", G),
///     "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
/// );
/// ```
///
///[_SEC 2: Recommended Elliptic Curve Domain Parameters_]: https://www.secg.org/sec2-v2.pdf
pub static G: &Point = &Point::GENERATOR;

#[doc(hidden)]
pub const TEST_SOUNDNESS: usize = 20;
