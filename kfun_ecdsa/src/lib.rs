//! Bitcoin compatible ECDSA: signing, verification, public key recovery and adaptor signatures.
//!
//! Signatures are deterministic by default, derived with [RFC6979] exactly like libsecp256k1 so
//! the same key and message give byte-for-byte the same signature.
//!
//! ```
//! use kfun_ecdsa::{ECDSA, fun::{ECPrivKey, Scalar}};
//! let ecdsa = ECDSA::default();
//! let secret_key = ECPrivKey::random(&mut rand::thread_rng());
//! let message = kfun_ecdsa::fun::hash::sha256(b"Attack at dawn");
//! let signature = ecdsa.sign(secret_key.secret(), &message).unwrap();
//! assert!(ecdsa.verify(&secret_key.pubkey(), &message, &signature));
//! ```
//!
//! [RFC6979]: https://datatracker.ietf.org/doc/html/rfc6979
#![no_std]
#![allow(non_snake_case)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub use kfun as fun;
pub use kfun::nonce;
use kfun::{
    Error, G, Point, Scalar,
    nonce::{NonceFunction, Rfc6979},
    op,
};
use zeroize::Zeroizing;

mod signature;
pub use signature::{RecoverableSignature, RecoveryId, Signature};
pub mod adaptor;
#[cfg(feature = "libsecp_compat")]
mod libsecp_compat;

/// An instance of the ECDSA signature scheme.
#[derive(Clone, Debug)]
pub struct ECDSA<NF = Rfc6979> {
    /// Derives the signing nonces.
    pub nonce_fn: NF,
    /// `enforce_low_s`: Whether the verify algorithm should enforce that the `s` component of the signature is low (see [BIP-146]).
    ///
    /// [BIP-146]: https://github.com/bitcoin/bips/blob/master/bip-0146.mediawiki#low_s
    pub enforce_low_s: bool,
}

impl Default for ECDSA {
    /// Signs with [`Rfc6979`] nonces like libsecp256k1 does.
    fn default() -> Self {
        ECDSA::new(Rfc6979::default())
    }
}

impl ECDSA<()> {
    /// Creates an `ECDSA` instance that cannot be used to sign messages but can
    /// verify signatures.
    pub fn verify_only() -> Self {
        ECDSA {
            nonce_fn: (),
            enforce_low_s: false,
        }
    }
}

impl<NF> ECDSA<NF> {
    /// Creates an instance that signs with nonces from `nonce_fn`.
    pub fn new(nonce_fn: NF) -> Self {
        ECDSA {
            nonce_fn,
            enforce_low_s: false,
        }
    }

    /// Transforms the ECDSA instance into one which enforces the [BIP-146] low s constraint.
    ///
    /// [BIP-146]: https://github.com/bitcoin/bips/blob/master/bip-0146.mediawiki#low_s
    pub fn enforce_low_s(self) -> Self {
        ECDSA {
            nonce_fn: self.nonce_fn,
            enforce_low_s: true,
        }
    }

    /// Verify an ECDSA signature.
    #[must_use]
    pub fn verify(&self, public_key: &Point, message: &[u8; 32], signature: &Signature) -> bool {
        let (R_x, s) = signature.as_tuple();
        // This ensures that there is only one valid s value per R_x for any given message.
        if s.is_high() && self.enforce_low_s {
            return false;
        }

        let m = Scalar::from_bytes_mod_order(*message);
        let s_inv = s.invert();

        op::g_double_mul(&(s_inv * m), &(s_inv * R_x), public_key)
            .non_zero()
            .is_some_and(|implied_R| implied_R.x_scalar().0 == *R_x)
    }

    /// Recovers the public key that produced a recoverable signature on `message`.
    ///
    /// Fails with [`Error::RecoveryFailed`] if the recovery id names a point that isn't on the
    /// curve or the computed key is the point at infinity. A signature that was made by someone
    /// else or on another message recovers to some unrelated key rather than failing so the caller
    /// must compare the result to the key they expect.
    pub fn recover(
        &self,
        message: &[u8; 32],
        signature: &RecoverableSignature,
    ) -> Result<Point, Error> {
        let RecoverableSignature {
            signature: Signature { R_x, s },
            recovery_id,
        } = signature;
        if s.is_high() && self.enforce_low_s {
            return Err(Error::RecoveryFailed);
        }
        let R = Point::from_scalar_x(R_x, recovery_id.is_x_overflowed(), recovery_id.is_y_odd())
            .ok_or(Error::RecoveryFailed)?;
        let m = Scalar::from_bytes_mod_order(*message);
        let r_inv = R_x.invert();
        // X = r⁻¹(sR - mG)
        op::double_mul(&(r_inv * s), &R, &-(r_inv * m), G)
            .non_zero()
            .ok_or(Error::RecoveryFailed)
    }
}

impl<NF: NonceFunction> ECDSA<NF> {
    /// Deterministically produce a ECDSA signature on a message hash.
    ///
    /// The returned signature always has a low `s`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kfun_ecdsa::{ECDSA, fun::{Scalar, hash::sha256}};
    ///
    /// let secret_key = Scalar::random(&mut rand::thread_rng());
    /// let ecdsa = ECDSA::default();
    /// let message_hash = sha256(b"Attack at dawn");
    /// let signature = ecdsa.sign(&secret_key, &message_hash).unwrap();
    /// assert!(signature.is_low_s());
    /// ```
    pub fn sign(&self, secret_key: &Scalar, message: &[u8; 32]) -> Result<Signature, Error> {
        self.sign_recoverable(secret_key, message)
            .map(|recoverable| recoverable.signature)
    }

    /// Like [`sign`](Self::sign) but also returns the [`RecoveryId`] needed by
    /// [`recover`](Self::recover).
    pub fn sign_recoverable(
        &self,
        secret_key: &Scalar,
        message: &[u8; 32],
    ) -> Result<RecoverableSignature, Error> {
        let x = secret_key;
        let m = Scalar::from_bytes_mod_order(*message);
        kfun::nonce::derive_nonce(&self.nonce_fn, x, &[], message, |k| {
            let R = op::mul_base(k);
            // r is R's x-coordinate mod n. It stands in for the Fiat-Shamir challenge of a
            // Schnorr signature. With no known algebraic relationship between k and R_x,
            // signatures are hard to forge.
            let (R_x, x_overflowed) = R.x_scalar();
            let R_x = R_x.non_zero()?;
            let k_inv = Zeroizing::new(k.invert());
            let mut s = (*k_inv * (m + R_x * x)).non_zero()?;

            // s values must be low (less than half group order), otherwise signatures
            // would be malleable i.e. (R,s) and (R,-s) would both be valid signatures.
            let high = s.is_high();
            s.conditional_negate(high);

            Some(RecoverableSignature {
                signature: Signature { R_x, s },
                // negating s is the same as signing with -k so the nonce point's parity flips
                recovery_id: RecoveryId::new(!R.is_y_even() ^ high, x_overflowed),
            })
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use kfun::{ECPrivKey, TEST_SOUNDNESS, nonce::FixedNonce};
    use rand::RngCore;

    fn random_message() -> [u8; 32] {
        let mut message = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut message);
        message
    }

    #[test]
    fn repeated_sign_and_verify() {
        let ecdsa = ECDSA::default();
        for _ in 0..TEST_SOUNDNESS {
            let message = random_message();
            let secret_key = Scalar::random(&mut rand::thread_rng());
            let public_key = op::mul_base(&secret_key);
            let sig = ecdsa.sign(&secret_key, &message).unwrap();
            assert!(ecdsa.verify(&public_key, &message, &sig));
            assert_eq!(ecdsa.sign(&secret_key, &message).unwrap(), sig);
            let other_message = random_message();
            assert!(!ecdsa.verify(&public_key, &other_message, &sig));
            let other_key = Point::random(&mut rand::thread_rng());
            assert!(!ecdsa.verify(&other_key, &message, &sig));
        }
    }

    #[test]
    fn low_s() {
        for _ in 0..TEST_SOUNDNESS {
            let ecdsa = ECDSA::default();
            let ecdsa_enforce_low_s = ECDSA::default().enforce_low_s();
            let message = random_message();
            let secret_key = Scalar::random(&mut rand::thread_rng());
            let public_key = op::mul_base(&secret_key);
            let mut sig = ecdsa.sign(&secret_key, &message).unwrap();
            assert!(sig.is_low_s());
            assert!(ecdsa.verify(&public_key, &message, &sig));
            assert!(ecdsa_enforce_low_s.verify(&public_key, &message, &sig));
            sig.s = -sig.s;
            assert!(!ecdsa_enforce_low_s.verify(&public_key, &message, &sig));
            assert!(ecdsa.verify(&public_key, &message, &sig));
        }
    }

    #[test]
    fn sign_recover_roundtrip() {
        let ecdsa = ECDSA::default();
        for _ in 0..TEST_SOUNDNESS {
            let message = random_message();
            let secret_key = ECPrivKey::random(&mut rand::thread_rng());
            let sig = ecdsa.sign_recoverable(secret_key.secret(), &message).unwrap();
            assert_eq!(ecdsa.recover(&message, &sig), Ok(secret_key.pubkey()));
            assert!(!sig.recovery_id.is_x_overflowed());

            // the other parity gives a different key
            let mut wrong_parity = sig;
            wrong_parity.recovery_id =
                RecoveryId::new(!sig.recovery_id.is_y_odd(), sig.recovery_id.is_x_overflowed());
            assert_ne!(ecdsa.recover(&message, &wrong_parity), Ok(secret_key.pubkey()));
        }
    }

    #[test]
    fn recovery_with_high_s() {
        let ecdsa = ECDSA::default();
        let message = random_message();
        let secret_key = ECPrivKey::random(&mut rand::thread_rng());
        let mut sig = ecdsa.sign_recoverable(secret_key.secret(), &message).unwrap();
        // undo the normalization by hand
        sig.signature.s = -sig.signature.s;
        sig.recovery_id = RecoveryId::new(!sig.recovery_id.is_y_odd(), false);
        assert_eq!(ecdsa.recover(&message, &sig), Ok(secret_key.pubkey()));
        assert_eq!(
            ecdsa.clone().enforce_low_s().recover(&message, &sig),
            Err(Error::RecoveryFailed)
        );
        sig.normalize_s();
        assert_eq!(ecdsa.recover(&message, &sig), Ok(secret_key.pubkey()));
    }

    #[test]
    fn recovery_fails_for_impossible_overflow() {
        // r values this large have no r + n below p
        let sig = RecoverableSignature {
            signature: Signature {
                R_x: -Scalar::one(),
                s: Scalar::one(),
            },
            recovery_id: RecoveryId::new(false, true),
        };
        assert_eq!(
            ECDSA::verify_only().recover(&[1u8; 32], &sig),
            Err(Error::RecoveryFailed)
        );
    }

    #[test]
    fn recovers_nonce_point_with_x_above_order() {
        use core::num::NonZeroU32;
        // n + 2 is the x-coordinate of a curve point so its r is 2 with the overflow bit set
        let x = kfun::hex::decode_array::<32>(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364143",
        )
        .unwrap();
        let R = Point::from_x_parity(x, false).unwrap();
        let r = Scalar::from_non_zero_u32(NonZeroU32::new(2).unwrap());
        assert_eq!(R.x_scalar(), (r.mark_zero(), true));
        assert_eq!(Point::from_scalar_x(&r, true, false), Some(R));

        let message = random_message();
        let sig = RecoverableSignature {
            signature: Signature {
                R_x: r,
                s: Scalar::from_non_zero_u32(NonZeroU32::new(7).unwrap()),
            },
            recovery_id: RecoveryId::new(false, true),
        };
        let ecdsa = ECDSA::verify_only();
        let public_key = ecdsa.recover(&message, &sig).unwrap();
        assert!(ecdsa.verify(&public_key, &message, &sig.signature));
        // without the overflow bit a different key comes out, if any
        let no_overflow = RecoverableSignature {
            recovery_id: RecoveryId::new(false, false),
            ..sig
        };
        assert_ne!(ecdsa.recover(&message, &no_overflow), Ok(public_key));
    }

    #[test]
    fn nonce_retries_are_bounded() {
        // a nonce function that only ever produces zero scalars
        let ecdsa = ECDSA::new(|_: &Scalar, _: &[u8], _: &[u8], _: u32| -> Option<Scalar> { None });
        let secret_key = Scalar::random(&mut rand::thread_rng());
        assert_eq!(
            ecdsa.sign(&secret_key, &random_message()),
            Err(Error::NonceExhausted)
        );
    }

    #[test]
    fn fixed_nonce_reproduces_signature() {
        let secret_key = Scalar::random(&mut rand::thread_rng());
        let nonce = Scalar::random(&mut rand::thread_rng());
        let message = random_message();
        let sig = ECDSA::new(FixedNonce(nonce)).sign(&secret_key, &message).unwrap();
        let R_x = op::mul_base(&nonce).x_scalar().0;
        assert_eq!(sig.R_x, R_x);
    }
}
