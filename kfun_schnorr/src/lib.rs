//! BIP340 Schnorr signatures and Schnorr adaptor signatures built on [`kfun`].
//!
//! ```
//! use kfun_schnorr::{Schnorr, Signature, fun::{ECPrivKey, XOnlyKeyPair}};
//! // Deterministic BIP340 nonces. Use `Synthetic::bip340(GlobalRng::<ThreadRng>::default())`
//! // to mix in fresh randomness.
//! let schnorr = Schnorr::default();
//! let keypair = XOnlyKeyPair::new(ECPrivKey::random(&mut rand::thread_rng()));
//! let message = b"Chancellor on brink of second bailout for banks";
//! let signature = schnorr.sign(&keypair, message).unwrap();
//! assert!(schnorr.verify(&keypair.public_key(), message, &signature));
//! // 64 bytes: the nonce's x-coordinate then s
//! assert_eq!(Signature::from_bytes(signature.to_bytes()), Some(signature));
//! ```
#![no_std]
#![allow(non_snake_case)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub use kfun as fun;
pub use kfun::nonce;

mod signature;
pub use signature::Signature;
pub mod adaptor;
mod schnorr;
pub use schnorr::*;

#[cfg(feature = "libsecp_compat")]
mod libsecp_compat;
