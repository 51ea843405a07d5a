use crate::Signature;
use alloc::vec::Vec;
use kfun::{
    Error, G, Point, Scalar, XOnly, XOnlyKeyPair,
    hash::{HashAdd, tagged_hash},
    marker::*,
    nonce::{self, NoAux, NonceFunction, Synthetic},
    op,
    rand_core::RngCore,
};
use sha2::Sha256;

/// An instance of the [BIP-340] Schnorr signature scheme.
///
/// The instance holds the [`NonceFunction`] used to derive signing nonces and the tagged hash
/// used to produce the [_Fiat-Shamir_] challenge.
///
/// [_Fiat-Shamir_]: https://en.wikipedia.org/wiki/Fiat%E2%80%93Shamir_heuristic
/// [BIP-340]: https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki
#[derive(Clone, Debug)]
pub struct Schnorr<NF = Synthetic<NoAux>> {
    nonce_fn: NF,
    challenge_hash: Sha256,
}

impl Default for Schnorr {
    /// Deterministic BIP340 nonces with the auxiliary randomness set to 32 zero bytes.
    fn default() -> Self {
        Schnorr::new(Synthetic::bip340(NoAux))
    }
}

impl Schnorr<()> {
    /// Creates an instance that can verify signatures but not create them.
    ///
    /// ```
    /// use kfun_schnorr::Schnorr;
    /// let taproot_schnorr = Schnorr::verify_only();
    /// ```
    pub fn verify_only() -> Self {
        Self::new(())
    }
}

impl<NF> Schnorr<NF> {
    /// Creates an instance that signs with nonces from `nonce_fn`.
    ///
    /// # Examples
    /// ```
    /// use kfun_schnorr::{
    ///     Schnorr,
    ///     nonce::{GlobalRng, NoAux, Synthetic},
    /// };
    /// use rand::rngs::ThreadRng;
    /// // Use synthetic nonces (preferred)
    /// let schnorr = Schnorr::new(Synthetic::bip340(GlobalRng::<ThreadRng>::default()));
    /// // Use deterministic nonces.
    /// let schnorr = Schnorr::new(Synthetic::bip340(NoAux));
    /// ```
    pub fn new(nonce_fn: NF) -> Self {
        Self {
            nonce_fn,
            challenge_hash: tagged_hash("BIP0340/challenge"),
        }
    }

    /// Returns the [`NonceFunction`] being used to derive nonces.
    pub fn nonce_fn(&self) -> &NF {
        &self.nonce_fn
    }

    /// Produces the Fiat-Shamir challenge for a Schnorr signature in the form specified by BIP-340.
    ///
    /// Concretely computes the hash `H(R || X || m)`.
    ///
    /// # Example
    ///
    /// Here's how you could use this to roll your own signatures.
    ///
    /// ```
    /// use kfun_schnorr::{Schnorr, Signature, fun::{ECPrivKey, Scalar, XOnly, XOnlyKeyPair}};
    /// let schnorr = Schnorr::default();
    /// let message = b"we rolled our own sign!";
    /// let keypair = XOnlyKeyPair::new(ECPrivKey::random(&mut rand::thread_rng()));
    /// let mut r = Scalar::random(&mut rand::thread_rng());
    /// let R = XOnly::from_scalar_mul(&mut r);
    /// let challenge = schnorr.challenge(&R, &keypair.public_key(), message);
    /// let s = r + challenge * keypair.secret_key().secret();
    /// let signature = Signature { R, s };
    /// assert!(schnorr.verify(&keypair.public_key(), message, &signature));
    /// ```
    pub fn challenge(&self, R: &XOnly, X: &XOnly, message: &[u8]) -> Scalar<Zero> {
        // The challenge pre-image is adversarially controlled so it may be zero
        Scalar::from_hash(self.challenge_hash.clone().add(*R).add(*X).add(message))
    }

    /// Verifies a signature on a message under a given public key.
    ///
    /// Computes `R' = s * G - e * X` and accepts only if `R'` is not the point at infinity, has an
    /// even y-coordinate and has the x-coordinate `R`.
    #[must_use]
    pub fn verify(&self, public_key: &XOnly, message: &[u8], signature: &Signature) -> bool {
        let (R, s) = signature.as_tuple();
        let c = self.challenge(R, public_key, message);
        let X = public_key.to_point();
        match op::g_double_mul(s, &-c, &X).non_zero() {
            Some(implied_R) => implied_R.is_y_even() && implied_R.to_xonly() == *R,
            None => false,
        }
    }

    /// Verifies many signatures at once.
    ///
    /// Each equation `s_i * G = R_i + e_i * X_i` is multiplied by a random coefficient `a_i` and
    /// the sum is checked with a single multi-scalar multiplication. This returns `true` exactly
    /// when every signature would pass [`verify`](Self::verify) except with negligible
    /// probability. An empty batch is valid.
    ///
    /// ```
    /// use kfun_schnorr::{Schnorr, fun::{ECPrivKey, XOnlyKeyPair}};
    /// let schnorr = Schnorr::default();
    /// let keypairs: Vec<_> = (0..4)
    ///     .map(|_| XOnlyKeyPair::new(ECPrivKey::random(&mut rand::thread_rng())))
    ///     .collect();
    /// let signatures: Vec<_> = keypairs
    ///     .iter()
    ///     .map(|keypair| schnorr.sign(keypair, b"hello").unwrap())
    ///     .collect();
    /// let batch = keypairs
    ///     .iter()
    ///     .zip(&signatures)
    ///     .map(|(keypair, signature)| (keypair.public_key(), &b"hello"[..], signature));
    /// assert!(schnorr.verify_batch(batch, &mut rand::thread_rng()));
    /// ```
    #[must_use]
    pub fn verify_batch<'a>(
        &self,
        batch: impl IntoIterator<Item = (XOnly, &'a [u8], &'a Signature)>,
        rng: &mut impl RngCore,
    ) -> bool {
        let mut s_sum = Scalar::<Zero>::zero();
        let mut scalars: Vec<Scalar<Zero>> = Vec::new();
        let mut points: Vec<Point<Zero>> = Vec::new();
        for (i, (public_key, message, signature)) in batch.into_iter().enumerate() {
            let (R, s) = signature.as_tuple();
            let c = self.challenge(R, &public_key, message);
            // the first coefficient can be one without weakening the check
            let a = if i == 0 {
                Scalar::one()
            } else {
                Scalar::random(rng)
            };
            s_sum += a * s;
            scalars.push((-a).mark_zero());
            points.push(R.to_point().mark_zero());
            scalars.push(-(a * c));
            points.push(public_key.to_point().mark_zero());
        }
        if scalars.is_empty() {
            return true;
        }
        scalars.push(s_sum);
        points.push(G.mark_zero());
        tracing::trace!(terms = scalars.len(), "batch verifying schnorr signatures");
        op::lincomb(&scalars, &points).is_zero()
    }

    /// _Anticipates_ a Schnorr signature given the nonce `R` that will be used ahead of time.
    /// Deterministically returns the group element that corresponds to the scalar value of the
    /// signature. i.e `R + c * X`
    pub fn anticipate_signature(&self, X: &XOnly, R: &XOnly, message: &[u8]) -> Point<Zero> {
        let c = self.challenge(R, X, message);
        op::double_mul(&Scalar::one(), &R.to_point(), &c, &X.to_point())
    }
}

impl<NF: NonceFunction> Schnorr<NF> {
    /// Sign a message using a key pair.
    ///
    /// The nonce is derived from the secret key, the x-only public key and the message. Fails only
    /// if the nonce function keeps returning nonces that can't be used.
    ///
    /// # Examples
    ///
    /// ```
    /// use kfun_schnorr::{Schnorr, fun::{ECPrivKey, XOnlyKeyPair}};
    /// let schnorr = Schnorr::default();
    /// let keypair = XOnlyKeyPair::new(ECPrivKey::random(&mut rand::thread_rng()));
    /// let message = b"Chancellor on brink of second bailout for banks";
    /// let signature = schnorr.sign(&keypair, message).unwrap();
    /// assert!(schnorr.verify(&keypair.public_key(), message, &signature));
    /// ```
    pub fn sign(&self, keypair: &XOnlyKeyPair, message: &[u8]) -> Result<Signature, Error> {
        let (x, X) = keypair.as_tuple();
        let x = x.secret();
        nonce::derive_nonce(&self.nonce_fn, x, X.as_bytes(), message, |r| {
            let mut r = zeroize::Zeroizing::new(*r);
            let R = XOnly::from_scalar_mul(&mut r);
            let c = self.challenge(&R, &X, message);
            Some(Signature { R, s: *r + c * x })
        })
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use kfun::{ECPrivKey, TEST_SOUNDNESS, nonce::GlobalRng};
    use rand::rngs::ThreadRng;

    fn keypair() -> XOnlyKeyPair {
        XOnlyKeyPair::new(ECPrivKey::random(&mut rand::thread_rng()))
    }

    #[test]
    fn anticipated_signature_on_should_correspond_to_actual_signature() {
        let schnorr = Schnorr::default();
        for _ in 0..TEST_SOUNDNESS {
            let keypair = keypair();
            let msg = b"Chancellor on brink of second bailout for banks";
            let signature = schnorr.sign(&keypair, msg).unwrap();
            let anticipated_signature =
                schnorr.anticipate_signature(&keypair.public_key(), &signature.R, msg);
            assert_eq!(
                anticipated_signature,
                op::mul_base(&signature.s),
                "should anticipate the same value as actual signature"
            )
        }
    }

    #[test]
    fn sign_deterministic() {
        let schnorr = Schnorr::default();
        for _ in 0..TEST_SOUNDNESS {
            let keypair_1 = keypair();
            let keypair_2 = keypair();
            let msg_atkdwn = b"attack at dawn";
            let msg_rtrtnoon = b"retreat at noon";
            let signature_1 = schnorr.sign(&keypair_1, msg_atkdwn).unwrap();
            let signature_2 = schnorr.sign(&keypair_1, msg_atkdwn).unwrap();
            let signature_3 = schnorr.sign(&keypair_1, msg_rtrtnoon).unwrap();
            let signature_4 = schnorr.sign(&keypair_2, msg_atkdwn).unwrap();

            assert!(schnorr.verify(&keypair_1.public_key(), msg_atkdwn, &signature_1));
            assert_eq!(signature_1, signature_2);
            assert_ne!(signature_3.R, signature_1.R);
            assert_ne!(signature_1.R, signature_4.R);
        }
    }

    #[test]
    fn synthetic_nonces_differ() {
        let schnorr = Schnorr::new(Synthetic::bip340(GlobalRng::<ThreadRng>::default()));
        let keypair = keypair();
        let first = schnorr.sign(&keypair, b"hello").unwrap();
        let second = schnorr.sign(&keypair, b"hello").unwrap();
        assert_ne!(first, second);
        assert!(schnorr.verify(&keypair.public_key(), b"hello", &first));
        assert!(schnorr.verify(&keypair.public_key(), b"hello", &second));
    }

    #[test]
    fn wrong_key_or_message_fails() {
        let schnorr = Schnorr::default();
        let keypair = keypair();
        let signature = schnorr.sign(&keypair, b"hello").unwrap();
        assert!(!schnorr.verify(&keypair.public_key(), b"goodbye", &signature));
        assert!(!schnorr.verify(&XOnly::random(&mut rand::thread_rng()), b"hello", &signature));
        let mut bad_s = signature;
        bad_s.s += Scalar::one();
        assert!(!schnorr.verify(&keypair.public_key(), b"hello", &bad_s));
        // the negated s verifies against R with an odd y-coordinate which is never accepted
        let negated = Signature {
            R: signature.R,
            s: -signature.s,
        };
        assert!(!schnorr.verify(&keypair.public_key(), b"hello", &negated));
    }

    #[test]
    fn batch_verification() {
        let schnorr = Schnorr::default();
        let messages: Vec<[u8; 8]> = (0..TEST_SOUNDNESS as u64).map(u64::to_be_bytes).collect();
        let keypairs: Vec<XOnlyKeyPair> = (0..TEST_SOUNDNESS).map(|_| keypair()).collect();
        let mut signatures: Vec<Signature> = keypairs
            .iter()
            .zip(&messages)
            .map(|(keypair, message)| schnorr.sign(keypair, message).unwrap())
            .collect();

        let batch = |signatures: &[Signature]| {
            schnorr.verify_batch(
                keypairs
                    .iter()
                    .zip(&messages)
                    .zip(signatures.iter())
                    .map(|((keypair, message), signature)| {
                        (keypair.public_key(), &message[..], signature)
                    })
                    .collect::<Vec<_>>(),
                &mut rand::thread_rng(),
            )
        };
        assert!(batch(&signatures));
        signatures[3].s += Scalar::one();
        assert!(!batch(&signatures));
        let empty: [(XOnly, &[u8], &Signature); 0] = [];
        assert!(Schnorr::verify_only().verify_batch(empty, &mut rand::thread_rng()));
    }

    #[test]
    fn nonce_retries_are_bounded() {
        let schnorr = Schnorr::new(|_: &Scalar, _: &[u8], _: &[u8], _: u32| -> Option<Scalar> { None });
        assert_eq!(
            schnorr.sign(&keypair(), b"hello"),
            Err(Error::NonceExhausted)
        );
    }
}
