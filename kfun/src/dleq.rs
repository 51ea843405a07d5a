//! Proofs of discrete logarithm equality.
//!
//! A [`DLEQProof`] convinces a verifier that `X = x * G` and `Z = x * Y` for the same secret `x`
//! without revealing it. This is the Chaum-Pedersen sigma protocol made non-interactive with a
//! BIP340 tagged hash. It is compatible with the DLEQ proofs in libsecp256k1-zkp's ECDSA adaptor
//! module.
//!
//! # Example
//! ```
//! use kfun::{Point, Scalar, dleq::Dleq, op};
//! let dleq = Dleq::default();
//! let x = Scalar::random(&mut rand::thread_rng());
//! let Y = Point::random(&mut rand::thread_rng());
//! let X = op::mul_base(&x);
//! let Z = op::scalar_mul_point(&x, &Y);
//! let proof = dleq.prove(&x, &Y, &X, &Z).unwrap();
//! assert!(dleq.verify(&proof, &Y, &X, &Z));
//! ```
use crate::{
    Error, Point, Scalar,
    hash::{self, HashAdd, tagged_hash},
    marker::*,
    nonce::{self, NoAux, NonceFunction, Synthetic},
    op,
};

/// The tag for the challenge hash and the nonce derivation.
pub const DLEQ_TAG: &str = "DLEQ";

/// A non-interactive proof that two points have the same discrete log with respect to `G` and a
/// second generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DLEQProof {
    /// The Fiat-Shamir challenge `e`.
    pub challenge: Scalar<Zero>,
    /// The response `s = k + e * x`.
    pub response: Scalar<Zero>,
}

impl DLEQProof {
    /// Serializes as `challenge || response`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.challenge.to_bytes());
        bytes[32..].copy_from_slice(&self.response.to_bytes());
        bytes
    }

    /// Decodes `challenge || response`. Returns `None` if either scalar is not less than the curve
    /// order.
    pub fn from_bytes(bytes: [u8; 64]) -> Option<Self> {
        Some(Self {
            challenge: Scalar::from_slice(&bytes[..32])?,
            response: Scalar::from_slice(&bytes[32..])?,
        })
    }
}

crate::impl_display_serialize! {
    fn to_bytes(proof: &DLEQProof) -> [u8;64] {
        proof.to_bytes()
    }
}

crate::impl_fromstr_deserialize! {
    name => "DLEQ proof",
    fn from_bytes(bytes: [u8;64]) -> Option<DLEQProof> {
        DLEQProof::from_bytes(bytes)
    }
}

/// Creates and verifies [`DLEQProof`]s.
#[derive(Debug, Clone)]
pub struct Dleq<NF = Synthetic<NoAux>> {
    nonce_fn: NF,
}

impl Default for Dleq {
    /// Deterministic nonces tagged like libsecp256k1-zkp's.
    fn default() -> Self {
        Self::new(Synthetic::with_tags(DLEQ_TAG, "ECDSAadaptor/aux", NoAux))
    }
}

impl<NF> Dleq<NF> {
    /// Creates a prover that derives its nonces with `nonce_fn`.
    pub fn new(nonce_fn: NF) -> Self {
        Self { nonce_fn }
    }

    /// Checks that `proof` shows `X = x * G` and `Z = x * Y` for some `x`.
    #[must_use]
    pub fn verify(&self, proof: &DLEQProof, Y: &Point, X: &Point, Z: &Point) -> bool {
        let minus_e = -proof.challenge;
        let s = &proof.response;
        let R1 = op::g_double_mul(s, &minus_e, X);
        let R2 = op::double_mul(s, Y, &minus_e, Z);
        let (R1, R2) = match (R1.non_zero(), R2.non_zero()) {
            (Some(R1), Some(R2)) => (R1, R2),
            _ => return false,
        };
        challenge(X, Y, Z, &R1, &R2) == proof.challenge
    }
}

impl<NF: NonceFunction> Dleq<NF> {
    /// Proves that `X = x * G` and `Z = x * Y`.
    ///
    /// `X` and `Z` are taken as given. If they aren't what they claim to be the proof won't verify.
    pub fn prove(&self, x: &Scalar, Y: &Point, X: &Point, Z: &Point) -> Result<DLEQProof, Error> {
        // the points are committed to through the message so the nonce differs per statement
        let message = hash::sha256(&[X.to_bytes(), Z.to_bytes()].concat());
        nonce::derive_nonce(&self.nonce_fn, x, &Y.to_bytes(), &message, |k| {
            let R1 = op::mul_base(k);
            let R2 = op::scalar_mul_point(k, Y);
            let e = challenge(X, Y, Z, &R1, &R2);
            Some(DLEQProof {
                challenge: e,
                response: k + e * x,
            })
        })
    }
}

/// `tagged_hash("DLEQ", X || Y || Z || R1 || R2)` with every point compressed.
fn challenge(X: &Point, Y: &Point, Z: &Point, R1: &Point, R2: &Point) -> Scalar<Zero> {
    Scalar::from_hash(
        tagged_hash(DLEQ_TAG)
            .add(*X)
            .add(*Y)
            .add(*Z)
            .add(*R1)
            .add(*R2),
    )
}
