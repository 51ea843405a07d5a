//! Private keys and key pairs.
//!
//! Public keys are plain [`Point`]s, or [`XOnly`]s for BIP340.
use crate::{Error, Point, Scalar, XOnly, hash, marker::*, op};
use rand_core::RngCore;
use zeroize::Zeroize;

/// A secp256k1 private key: a non-zero scalar.
///
/// The scalar is wiped from memory when the key is dropped. Copies handed out by
/// [`secret`](Self::secret) are the caller's responsibility.
///
/// # Example
/// ```
/// use kfun::{ECPrivKey, G};
/// let privkey = ECPrivKey::random(&mut rand::thread_rng());
/// let pubkey = privkey.pubkey();
/// assert_eq!(ECPrivKey::from_bytes(privkey.to_bytes()).unwrap().pubkey(), pubkey);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ECPrivKey(Scalar);

impl ECPrivKey {
    /// Wraps a non-zero scalar.
    pub fn new(secret: Scalar) -> Self {
        ECPrivKey(secret)
    }

    /// Decodes a 32-byte big-endian private key. Returns `None` if the bytes are zero or not less
    /// than the curve order.
    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        Scalar::from_bytes(bytes).map(Self)
    }

    /// Calls [`from_bytes`](Self::from_bytes) on a slice. Returns `None` if its length isn't 32.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        Scalar::from_slice(slice).map(Self)
    }

    /// Generates a uniformly random private key.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        Self(Scalar::random(rng))
    }

    /// The 32-byte big-endian encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// The secret scalar.
    pub fn secret(&self) -> &Scalar {
        &self.0
    }

    /// The public key `x * G`.
    pub fn pubkey(&self) -> Point {
        op::mul_base(&self.0)
    }

    /// The BIP340 public key. This is the x-coordinate of [`pubkey`](Self::pubkey).
    pub fn xonly_pubkey(&self) -> XOnly {
        self.pubkey().to_xonly()
    }

    /// Returns the key `-x`.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self(-self.0)
    }

    /// Returns the key `x + tweak`, failing if that is zero.
    pub fn tweak_add<Z>(&self, tweak: &Scalar<Z>) -> Result<Self, Error> {
        (self.0 + tweak).non_zero().map(Self).ok_or(Error::ZeroScalar)
    }

    /// Returns the key `x * tweak`.
    #[must_use]
    pub fn tweak_mul(&self, tweak: &Scalar) -> Self {
        Self(self.0 * tweak)
    }

    /// Diffie-Hellman with the public key of another party.
    ///
    /// Returns the SHA256 hash of the compressed shared point like libsecp256k1's default ECDH
    /// hash function.
    ///
    /// # Example
    /// ```
    /// use kfun::ECPrivKey;
    /// let alice = ECPrivKey::random(&mut rand::thread_rng());
    /// let bob = ECPrivKey::random(&mut rand::thread_rng());
    /// assert_eq!(alice.ecdh(&bob.pubkey()), bob.ecdh(&alice.pubkey()));
    /// ```
    pub fn ecdh(&self, public_key: &Point) -> [u8; 32] {
        let shared = op::scalar_mul_point(&self.0, public_key);
        hash::sha256(&shared.to_bytes())
    }
}

impl Drop for ECPrivKey {
    fn drop(&mut self) {
        self.0.0.zeroize();
    }
}

impl core::fmt::Debug for ECPrivKey {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "ECPrivKey(..)")
    }
}

impl From<Scalar> for ECPrivKey {
    fn from(secret: Scalar) -> Self {
        Self::new(secret)
    }
}

/// Adds `tweak * G` to a public key, failing if the result is the point at infinity.
///
/// This mirrors [`ECPrivKey::tweak_add`] on the public side.
pub fn tweak_add_pubkey<Z>(public_key: &Point, tweak: &Scalar<Z>) -> Result<Point, Error> {
    (public_key + op::mul_base(tweak))
        .non_zero()
        .ok_or(Error::PointAtInfinity)
}

/// Sums public keys, failing if they cancel out.
pub fn combine_pubkeys<'a>(public_keys: impl IntoIterator<Item = &'a Point>) -> Result<Point, Error> {
    public_keys
        .into_iter()
        .fold(Point::<Zero>::zero(), |acc, key| acc + key)
        .non_zero()
        .ok_or(Error::PointAtInfinity)
}

/// A private key and its public key.
///
/// ```
/// use kfun::{ECPrivKey, KeyPair};
/// let keypair = KeyPair::new(ECPrivKey::random(&mut rand::thread_rng()));
/// let (secret_key, public_key) = keypair.as_tuple();
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KeyPair {
    sk: ECPrivKey,
    pk: Point,
}

impl KeyPair {
    /// Computes the public key for `secret_key`.
    pub fn new(secret_key: ECPrivKey) -> Self {
        Self {
            pk: secret_key.pubkey(),
            sk: secret_key,
        }
    }

    /// The private key.
    pub fn secret_key(&self) -> &ECPrivKey {
        &self.sk
    }

    /// The public key.
    pub fn public_key(&self) -> Point {
        self.pk
    }

    /// Both halves as a tuple.
    pub fn as_tuple(&self) -> (&ECPrivKey, Point) {
        (&self.sk, self.pk)
    }
}

impl From<ECPrivKey> for KeyPair {
    fn from(secret_key: ECPrivKey) -> Self {
        Self::new(secret_key)
    }
}

/// A private key and its BIP340 public key.
///
/// **The private key stored is not always the one passed in.** When the full public key has an
/// odd y-coordinate the private key is negated so that it is the discrete log of the even-y point
/// the x-only key stands for.
///
/// # Example
/// ```
/// use kfun::{ECPrivKey, XOnlyKeyPair, op};
/// let original = ECPrivKey::random(&mut rand::thread_rng());
/// let keypair = XOnlyKeyPair::new(original.clone());
/// assert!(keypair.secret_key() == &original || keypair.secret_key() == &original.negate());
/// assert_eq!(op::mul_base(keypair.secret_key().secret()), keypair.public_key().to_point());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct XOnlyKeyPair {
    sk: ECPrivKey,
    pk: XOnly,
}

impl XOnlyKeyPair {
    /// Computes the x-only public key, negating `secret_key` if required.
    pub fn new(secret_key: ECPrivKey) -> Self {
        let mut sk = *secret_key.secret();
        let pk = XOnly::from_scalar_mul(&mut sk);
        Self {
            sk: ECPrivKey(sk),
            pk,
        }
    }

    /// The private key whose public key has an even y-coordinate.
    pub fn secret_key(&self) -> &ECPrivKey {
        &self.sk
    }

    /// The x-only public key.
    pub fn public_key(&self) -> XOnly {
        self.pk
    }

    /// Both halves as a tuple.
    pub fn as_tuple(&self) -> (&ECPrivKey, XOnly) {
        (&self.sk, self.pk)
    }
}

impl From<ECPrivKey> for XOnlyKeyPair {
    fn from(secret_key: ECPrivKey) -> Self {
        Self::new(secret_key)
    }
}

impl From<XOnlyKeyPair> for KeyPair {
    fn from(keypair: XOnlyKeyPair) -> Self {
        KeyPair {
            pk: keypair.pk.to_point(),
            sk: keypair.sk,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::G;

    #[test]
    fn private_key_encoding() {
        assert!(ECPrivKey::from_bytes([0u8; 32]).is_none());
        assert!(ECPrivKey::from_bytes([0xff; 32]).is_none());
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(ECPrivKey::from_bytes(one).unwrap().pubkey(), *G);
        assert_eq!(format!("{:?}", ECPrivKey::from_bytes(one).unwrap()), "ECPrivKey(..)");
    }

    #[test]
    fn tweaks_commute_with_public_key() {
        let privkey = ECPrivKey::random(&mut rand::thread_rng());
        let tweak = Scalar::random(&mut rand::thread_rng());
        let tweaked = privkey.tweak_add(&tweak).unwrap();
        assert_eq!(
            tweaked.pubkey(),
            tweak_add_pubkey(&privkey.pubkey(), &tweak).unwrap()
        );
        assert_eq!(
            privkey.tweak_mul(&tweak).pubkey(),
            op::scalar_mul_point(&tweak, &privkey.pubkey())
        );
        assert_eq!(privkey.tweak_add(&-*privkey.secret()), Err(Error::ZeroScalar));
        assert_eq!(
            tweak_add_pubkey(&privkey.pubkey(), &-*privkey.secret()),
            Err(Error::PointAtInfinity)
        );
    }

    #[test]
    fn combining_keys() {
        let a = ECPrivKey::random(&mut rand::thread_rng());
        let b = ECPrivKey::random(&mut rand::thread_rng());
        let sum = combine_pubkeys([a.pubkey(), b.pubkey()].iter()).unwrap();
        assert_eq!(sum, a.tweak_add(b.secret()).unwrap().pubkey());
        assert_eq!(
            combine_pubkeys([a.pubkey(), a.negate().pubkey()].iter()),
            Err(Error::PointAtInfinity)
        );
    }

    #[test]
    fn xonly_keypair_has_even_y() {
        for _ in 0..crate::TEST_SOUNDNESS {
            let keypair = XOnlyKeyPair::new(ECPrivKey::random(&mut rand::thread_rng()));
            let full: KeyPair = keypair.clone().into();
            assert!(full.public_key().is_y_even());
            assert_eq!(full.public_key().to_xonly(), keypair.public_key());
        }
    }
}
