//! ECDSA adaptor signatures.
//!
//! An adaptor signature is a signature "encrypted" under someone's public key `Y`. Anyone can check
//! it would decrypt to a valid signature, only the owner of `y` can decrypt it, and once the
//! decrypted signature is published the encrypted one reveals `y` to its creator.
//!
//! The scheme is [Lloyd Fourn's one-time VES] with the DLEQ proof and nonce derivation of
//! libsecp256k1-zkp's `ecdsa_adaptor` module.
//!
//! ```
//! use kfun_ecdsa::{adaptor::Adaptor, fun::{Point, Scalar, op}};
//! let adaptor = Adaptor::default();
//! let secret_key = Scalar::random(&mut rand::thread_rng());
//! let public_key = op::mul_base(&secret_key);
//! let decryption_key = Scalar::random(&mut rand::thread_rng());
//! let encryption_key = op::mul_base(&decryption_key);
//! let message = [42u8; 32];
//!
//! let encrypted = adaptor.encrypted_sign(&secret_key, &encryption_key, &message).unwrap();
//! assert!(adaptor.verify_encrypted_signature(&public_key, &encryption_key, &message, &encrypted));
//!
//! let signature = adaptor.decrypt_signature(&decryption_key, &encrypted).unwrap();
//! assert!(adaptor.ecdsa.verify(&public_key, &message, &signature));
//!
//! let recovered = adaptor.recover_decryption_key(&encryption_key, &signature, &encrypted).unwrap();
//! assert_eq!(recovered, decryption_key);
//! ```
//!
//! [Lloyd Fourn's one-time VES]: https://github.com/LLFourn/one-time-VES/blob/master/main.pdf
use crate::{ECDSA, Signature};
use kfun::{
    Error, Point, Scalar,
    dleq::Dleq,
    nonce::{self, NoAux, NonceFunction, Synthetic},
    op,
};
use zeroize::Zeroizing;

mod encrypted_signature;
pub use encrypted_signature::{EncryptedSignature, PointNonce};

/// Creates, verifies, decrypts and recovers from ECDSA adaptor signatures.
#[derive(Clone, Debug)]
pub struct Adaptor<NF = Synthetic<NoAux>, DF = Synthetic<NoAux>> {
    /// The underlying ECDSA instance. Its nonce function derives the signing nonce `k`.
    pub ecdsa: ECDSA<NF>,
    /// Proves `R` and `R_hat` share the nonce `k`.
    pub dleq: Dleq<DF>,
}

impl Default for Adaptor {
    /// Deterministic nonces tagged like libsecp256k1-zkp's.
    fn default() -> Self {
        Self::new(
            ECDSA::new(Synthetic::with_tags(
                "ECDSAadaptor/non",
                "ECDSAadaptor/aux",
                NoAux,
            )),
            Dleq::default(),
        )
    }
}

impl<NF, DF> Adaptor<NF, DF> {
    /// Combines an ECDSA instance for the signing nonce with a DLEQ prover.
    pub fn new(ecdsa: ECDSA<NF>, dleq: Dleq<DF>) -> Self {
        Self { ecdsa, dleq }
    }

    /// Checks that `ciphertext` decrypts to a signature on `message` under `verification_key`
    /// with the decryption key belonging to `encryption_key`.
    #[must_use]
    pub fn verify_encrypted_signature(
        &self,
        verification_key: &Point,
        encryption_key: &Point,
        message: &[u8; 32],
        ciphertext: &EncryptedSignature,
    ) -> bool {
        let X = verification_key;
        let Y = encryption_key;
        let m = Scalar::from_bytes_mod_order(*message);
        let EncryptedSignature {
            R,
            R_hat,
            proof,
            s_hat,
        } = ciphertext;

        if !self.dleq.verify(proof, Y, R_hat, &R.point) {
            return false;
        }
        let s_hat_inv = s_hat.invert();

        op::g_double_mul(&(s_hat_inv * m), &(s_hat_inv * R.x_scalar), X) == *R_hat
    }

    /// Decrypts `ciphertext` into a signature with a low `s`.
    ///
    /// Fails with [`Error::KeyMismatch`] if `decryption_key` isn't the key it was encrypted to.
    pub fn decrypt_signature(
        &self,
        decryption_key: &Scalar,
        ciphertext: &EncryptedSignature,
    ) -> Result<Signature, Error> {
        let y = decryption_key;
        let EncryptedSignature { R, R_hat, s_hat, .. } = ciphertext;
        // the right key turns k * G into k * Y
        if op::scalar_mul_point(y, R_hat) != R.point {
            tracing::debug!("decryption key does not match the encrypted signature's nonce");
            return Err(Error::KeyMismatch);
        }
        let y_inv = Zeroizing::new(y.invert());
        let mut signature = Signature {
            R_x: R.x_scalar,
            s: *s_hat * *y_inv,
        };
        signature.normalize_s();
        Ok(signature)
    }

    /// Recovers the decryption key from a decrypted signature and the encrypted signature it came
    /// from.
    ///
    /// Fails with [`Error::NonceMismatch`] if the signature's `r` doesn't match the encrypted
    /// signature and [`Error::KeyMismatch`] if the recovered key doesn't belong to
    /// `encryption_key`.
    pub fn recover_decryption_key(
        &self,
        encryption_key: &Point,
        signature: &Signature,
        ciphertext: &EncryptedSignature,
    ) -> Result<Scalar, Error> {
        if ciphertext.R.x_scalar != signature.R_x
            || (signature.s.is_high() && self.ecdsa.enforce_low_s)
        {
            return Err(Error::NonceMismatch);
        }
        let s = &signature.s;
        // the signature may have been normalized so y is only known up to sign
        let y = s.invert() * ciphertext.s_hat;
        let Y = op::mul_base(&y);

        if Y == *encryption_key {
            Ok(y)
        } else if -Y == *encryption_key {
            Ok(-y)
        } else {
            tracing::debug!("recovered decryption key does not match the encryption key");
            Err(Error::KeyMismatch)
        }
    }
}

impl<NF: NonceFunction, DF: NonceFunction> Adaptor<NF, DF> {
    /// Creates a signature on `message` with `signing_key` encrypted to `encryption_key`.
    ///
    /// The encryption key is passed to the nonce function as its public input. [`Synthetic`]
    /// nonces commit to it but [`Rfc6979`] ignores it, so with RFC6979 the same nonce is used
    /// for every encryption key.
    ///
    /// [`Rfc6979`]: kfun::nonce::Rfc6979
    pub fn encrypted_sign(
        &self,
        signing_key: &Scalar,
        encryption_key: &Point,
        message: &[u8; 32],
    ) -> Result<EncryptedSignature, Error> {
        let x = signing_key;
        let Y = encryption_key;
        let m = Scalar::from_bytes_mod_order(*message);
        nonce::derive_nonce(&self.ecdsa.nonce_fn, x, &Y.to_bytes(), message, |k| {
            let R_hat = op::mul_base(k);
            // The point with x-coordinate = 0 mod q exists, but it will never
            // occur since k is pseudorandomly chosen for a given Y, R = k*Y
            // will also be uniform.
            let R = PointNonce::from_point(op::scalar_mul_point(k, Y))?;
            let k_inv = Zeroizing::new(k.invert());
            let s_hat = (*k_inv * (m + R.x_scalar * x)).non_zero()?;
            Some(
                self.dleq
                    .prove(k, Y, &R_hat, &R.point)
                    .map(|proof| EncryptedSignature {
                        R,
                        R_hat,
                        s_hat,
                        proof,
                    }),
            )
        })?
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use kfun::{TEST_SOUNDNESS, nonce::GlobalRng};
    use rand::rngs::ThreadRng;

    #[test]
    fn end_to_end() {
        let ecdsa_adaptor = Adaptor::default();
        for _ in 0..TEST_SOUNDNESS {
            let msg = b"hello world you are beautiful!!!";
            let signing_key = Scalar::random(&mut rand::thread_rng());
            let verification_key = op::mul_base(&signing_key);
            let decryption_key = Scalar::random(&mut rand::thread_rng());
            let encryption_key = op::mul_base(&decryption_key);
            let ciphertext = ecdsa_adaptor
                .encrypted_sign(&signing_key, &encryption_key, msg)
                .unwrap();
            assert!(ecdsa_adaptor.verify_encrypted_signature(
                &verification_key,
                &encryption_key,
                msg,
                &ciphertext,
            ));

            let signature = ecdsa_adaptor
                .decrypt_signature(&decryption_key, &ciphertext)
                .unwrap();
            assert!(signature.is_low_s());
            assert!(ecdsa_adaptor.ecdsa.verify(&verification_key, msg, &signature));

            let recovered_decryption_key = ecdsa_adaptor
                .recover_decryption_key(&encryption_key, &signature, &ciphertext)
                .unwrap();

            assert_eq!(recovered_decryption_key, decryption_key);
        }
    }

    #[test]
    fn randomized_nonces() {
        let rng = Synthetic::with_tags("ECDSAadaptor/non", "ECDSAadaptor/aux", GlobalRng::<ThreadRng>::default());
        let ecdsa_adaptor = Adaptor::new(ECDSA::new(rng), Dleq::default());
        let signing_key = Scalar::random(&mut rand::thread_rng());
        let encryption_key = Point::random(&mut rand::thread_rng());
        let msg = [7u8; 32];
        let first = ecdsa_adaptor.encrypted_sign(&signing_key, &encryption_key, &msg).unwrap();
        let second = ecdsa_adaptor.encrypted_sign(&signing_key, &encryption_key, &msg).unwrap();
        assert_ne!(first.R, second.R);
        for ciphertext in [first, second] {
            assert!(ecdsa_adaptor.verify_encrypted_signature(
                &op::mul_base(&signing_key),
                &encryption_key,
                &msg,
                &ciphertext
            ));
        }
    }

    #[test]
    fn only_synthetic_nonces_commit_to_encryption_key() {
        let signing_key = Scalar::random(&mut rand::thread_rng());
        let msg = [9u8; 32];
        let first_key = Point::random(&mut rand::thread_rng());
        let second_key = Point::random(&mut rand::thread_rng());

        let synthetic = Adaptor::default();
        let a = synthetic.encrypted_sign(&signing_key, &first_key, &msg).unwrap();
        let b = synthetic.encrypted_sign(&signing_key, &second_key, &msg).unwrap();
        assert_ne!(a.R_hat, b.R_hat);

        let rfc6979 = Adaptor::new(ECDSA::new(kfun::nonce::Rfc6979::default()), Dleq::default());
        let a = rfc6979.encrypted_sign(&signing_key, &first_key, &msg).unwrap();
        let b = rfc6979.encrypted_sign(&signing_key, &second_key, &msg).unwrap();
        assert_eq!(a.R_hat, b.R_hat);
    }

    #[test]
    fn wrong_keys_are_rejected() {
        let ecdsa_adaptor = Adaptor::default();
        let msg = [1u8; 32];
        let signing_key = Scalar::random(&mut rand::thread_rng());
        let verification_key = op::mul_base(&signing_key);
        let decryption_key = Scalar::random(&mut rand::thread_rng());
        let encryption_key = op::mul_base(&decryption_key);
        let ciphertext = ecdsa_adaptor
            .encrypted_sign(&signing_key, &encryption_key, &msg)
            .unwrap();
        let other_key = Scalar::random(&mut rand::thread_rng());
        let other_point = op::mul_base(&other_key);

        assert!(!ecdsa_adaptor.verify_encrypted_signature(&other_point, &encryption_key, &msg, &ciphertext));
        assert!(!ecdsa_adaptor.verify_encrypted_signature(&verification_key, &other_point, &msg, &ciphertext));
        assert!(!ecdsa_adaptor.verify_encrypted_signature(&verification_key, &encryption_key, &[2u8; 32], &ciphertext));

        assert_eq!(
            ecdsa_adaptor.decrypt_signature(&other_key, &ciphertext),
            Err(Error::KeyMismatch)
        );

        let signature = ecdsa_adaptor
            .decrypt_signature(&decryption_key, &ciphertext)
            .unwrap();
        assert_eq!(
            ecdsa_adaptor.recover_decryption_key(&other_point, &signature, &ciphertext),
            Err(Error::KeyMismatch)
        );

        let unrelated = ecdsa_adaptor.ecdsa.sign(&signing_key, &msg).unwrap();
        assert_eq!(
            ecdsa_adaptor.recover_decryption_key(&encryption_key, &unrelated, &ciphertext),
            Err(Error::NonceMismatch)
        );
    }

    #[test]
    fn tampering_is_detected() {
        let ecdsa_adaptor = Adaptor::default();
        let msg = [3u8; 32];
        let signing_key = Scalar::random(&mut rand::thread_rng());
        let verification_key = op::mul_base(&signing_key);
        let encryption_key = Point::random(&mut rand::thread_rng());
        let bytes = ecdsa_adaptor
            .encrypted_sign(&signing_key, &encryption_key, &msg)
            .unwrap()
            .to_bytes();
        for i in 0..bytes.len() {
            let mut tampered = bytes;
            tampered[i] ^= 0x01;
            if let Some(ciphertext) = EncryptedSignature::from_bytes(tampered) {
                assert!(!ecdsa_adaptor.verify_encrypted_signature(
                    &verification_key,
                    &encryption_key,
                    &msg,
                    &ciphertext
                ));
            }
        }
    }
}
