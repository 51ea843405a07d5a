//! Algorithms for Schnorr "adaptor signature" signature encryption.
//!
//! Adaptor signatures are a kind of signature encryption. Just as you would expect this means you
//! can't get the signature from the encrypted signature unless you know the decryption key. As you
//! might not necessarily expect, this encryption is _one-time_ in that anyone who knows the
//! encrypted signature can recover the decryption key from the decrypted signature.
//!
//! This weird leaking of the decryption key is incredibly useful has numerous
//! applications in Bitcoin and cryptography more generally.
//!
//! # Synopsis
//! ```
//! use kfun_schnorr::{
//!     Schnorr,
//!     adaptor::{Adaptor, EncryptedSign},
//!     fun::{ECPrivKey, Scalar, XOnlyKeyPair},
//!     nonce::{GlobalRng, Synthetic},
//! };
//! use rand::rngs::ThreadRng;
//! let schnorr = Schnorr::new(Synthetic::bip340(GlobalRng::<ThreadRng>::default()));
//! let signing_keypair = XOnlyKeyPair::new(ECPrivKey::random(&mut rand::thread_rng()));
//! let verification_key = signing_keypair.public_key();
//! let decryption_key = Scalar::random(&mut rand::thread_rng());
//! let encryption_key = schnorr.encryption_key_for(&decryption_key);
//! let message = b"send 1 BTC to Bob";
//!
//! // Alice knows: signing_keypair, encryption_key
//! // Bob knows: decryption_key, verification_key
//!
//! // Alice creates an encrypted signature and sends it to Bob
//! let encrypted_signature = schnorr
//!     .encrypted_sign(&signing_keypair, &encryption_key, message)
//!     .unwrap();
//!
//! // Bob verifies it and decrypts it
//! assert!(schnorr.verify_encrypted_signature(
//!     &verification_key,
//!     &encryption_key,
//!     message,
//!     &encrypted_signature
//! ));
//! let signature = schnorr.decrypt_signature(&decryption_key, &encrypted_signature);
//!
//! // Bob then broadcasts the signature to the public.
//! // Once Alice sees it she can recover Bob's secret decryption key
//! match schnorr.recover_decryption_key(&encryption_key, &encrypted_signature, &signature) {
//!     Ok(decryption_key) => println!("Alice got the decryption key {}", decryption_key),
//!     Err(e) => eprintln!("signature is not the decryption of our original encrypted signature: {}", e),
//! }
//! ```
use crate::{Schnorr, Signature};
use kfun::{
    Error, Point, Scalar, XOnlyKeyPair,
    nonce::{self, NonceFunction},
    op,
};
use zeroize::Zeroizing;

mod encrypted_signature;
pub use encrypted_signature::EncryptedSignature;

/// Extension trait for [`Schnorr`] to add the encrypted signing algorithm.
///
/// [`Schnorr`]: crate::Schnorr
pub trait EncryptedSign {
    /// Create a signature on a message encrypted under `encryption_key`.
    ///
    /// See the [synopsis] for usage.
    ///
    /// [synopsis]: crate::adaptor#synopsis
    fn encrypted_sign(
        &self,
        signing_keypair: &XOnlyKeyPair,
        encryption_key: &Point,
        message: &[u8],
    ) -> Result<EncryptedSignature, Error>;
}

impl<NF: NonceFunction> EncryptedSign for Schnorr<NF> {
    fn encrypted_sign(
        &self,
        signing_keypair: &XOnlyKeyPair,
        encryption_key: &Point,
        message: &[u8],
    ) -> Result<EncryptedSignature, Error> {
        let (x, X) = signing_keypair.as_tuple();
        let x = x.secret();
        let Y = encryption_key;
        // Y goes into the nonce derivation so that R = r * G + Y is pseudorandom for every Y
        let mut public = [0u8; 65];
        public[..32].copy_from_slice(X.as_bytes());
        public[32..].copy_from_slice(&Y.to_bytes());

        nonce::derive_nonce(self.nonce_fn(), x, &public, message, |r| {
            let R = (op::mul_base(r) + Y).non_zero()?;
            let (R, needs_negation) = R.into_point_with_even_y();
            // We correct r here but we can't correct the decryption key (y) so we
            // store in "needs_negation" whether the decryptor needs to negate their
            // key before decrypting it
            let mut r = Zeroizing::new(*r);
            r.conditional_negate(needs_negation);
            let c = self.challenge(&R.to_xonly(), &X, message);
            Some(EncryptedSignature {
                R,
                s_hat: *r + c * x,
                needs_negation,
            })
        })
    }
}

/// Extension trait adding the algorithms for the adaptor signature scheme to instances of [`Schnorr`].
pub trait Adaptor {
    /// Derives the public encryption key corresponding to a secret decryption key.
    ///
    /// # Example
    /// ```
    /// # use kfun_schnorr::{adaptor::Adaptor, fun::Scalar, Schnorr};
    /// # let schnorr = Schnorr::default();
    /// let decryption_key = Scalar::random(&mut rand::thread_rng());
    /// let encryption_key = schnorr.encryption_key_for(&decryption_key);
    /// ```
    fn encryption_key_for(&self, decryption_key: &Scalar) -> Point;

    /// Verifies an encrypted signature is valid i.e. if it is decrypted it will yield a signature
    /// on `message` under `verification_key`.
    ///
    /// See [synopsis] for usage.
    ///
    /// [synopsis]: crate::adaptor#synopsis
    #[must_use]
    fn verify_encrypted_signature(
        &self,
        verification_key: &kfun::XOnly,
        encryption_key: &Point,
        message: &[u8],
        encrypted_signature: &EncryptedSignature,
    ) -> bool;

    /// Decrypts an encrypted signature yielding the signature.
    ///
    /// There are two crucial things to understand when calling this:
    ///
    /// 1. You should be certain that the encrypted signature is what you think it is by calling
    ///    [`verify_encrypted_signature`] on it first.
    /// 2. Once you give the decrypted signature to anyone who has seen `encrypted_signature` they will be
    ///    able to learn `decryption_key` by calling [`recover_decryption_key`].
    ///
    /// See [synopsis] for an example
    ///
    /// [`verify_encrypted_signature`]: Adaptor::verify_encrypted_signature
    /// [`recover_decryption_key`]: Adaptor::recover_decryption_key
    /// [synopsis]: crate::adaptor#synopsis
    fn decrypt_signature(
        &self,
        decryption_key: &Scalar,
        encrypted_signature: &EncryptedSignature,
    ) -> Signature;

    /// Recovers the decryption key given an encrypted signature and the signature that was
    /// decrypted from it.
    ///
    /// Fails with [`Error::NonceMismatch`] if `signature` doesn't use the encrypted signature's
    /// nonce and with [`Error::KeyMismatch`] if the recovered key doesn't belong to
    /// `encryption_key`. If it returns `Ok(decryption_key)`, then `signature` is the unique
    /// signature obtained by decrypting `encrypted_signature` with `decryption_key`. In other
    /// words, if you already know that `encrypted_signature` is valid you do not have to call
    /// [`Schnorr::verify`] on `signature` before calling this function because this function
    /// returning `Ok` implies it.
    ///
    /// See [synopsis] for an example
    ///
    /// [synopsis]: crate::adaptor#synopsis
    fn recover_decryption_key(
        &self,
        encryption_key: &Point,
        encrypted_signature: &EncryptedSignature,
        signature: &Signature,
    ) -> Result<Scalar, Error>;
}

impl<NF> Adaptor for Schnorr<NF> {
    fn encryption_key_for(&self, decryption_key: &Scalar) -> Point {
        op::mul_base(decryption_key)
    }

    fn verify_encrypted_signature(
        &self,
        verification_key: &kfun::XOnly,
        encryption_key: &Point,
        message: &[u8],
        encrypted_signature: &EncryptedSignature,
    ) -> bool {
        let EncryptedSignature {
            R,
            s_hat,
            needs_negation,
        } = encrypted_signature;
        if !R.is_y_even() {
            return false;
        }
        let X = verification_key;
        let Y = encryption_key;

        //  needs_negation => R_hat = R + Y
        // !needs_negation => R_hat = R - Y
        let R_hat = *R + Y.conditional_negate(!needs_negation);
        let c = self.challenge(&R.to_xonly(), X, message);

        R_hat == op::g_double_mul(s_hat, &-c, &X.to_point())
    }

    fn decrypt_signature(
        &self,
        decryption_key: &Scalar,
        encrypted_signature: &EncryptedSignature,
    ) -> Signature {
        let EncryptedSignature {
            R,
            s_hat,
            needs_negation,
        } = encrypted_signature;
        let mut y = Zeroizing::new(*decryption_key);
        y.conditional_negate(*needs_negation);
        Signature {
            R: R.to_xonly(),
            s: *s_hat + *y,
        }
    }

    fn recover_decryption_key(
        &self,
        encryption_key: &Point,
        encrypted_signature: &EncryptedSignature,
        signature: &Signature,
    ) -> Result<Scalar, Error> {
        if signature.R != encrypted_signature.R.to_xonly() {
            return Err(Error::NonceMismatch);
        }

        let EncryptedSignature {
            s_hat,
            needs_negation,
            ..
        } = encrypted_signature;
        let s = &signature.s;

        let mut y = *s - s_hat;
        y.conditional_negate(*needs_negation);
        let y = y.non_zero().ok_or(Error::KeyMismatch)?;

        if op::mul_base(&y) == *encryption_key {
            Ok(y)
        } else {
            tracing::debug!("recovered decryption key does not match the encryption key");
            Err(Error::KeyMismatch)
        }
    }
}
