use kfun::{Scalar, XOnly, marker::*, rand_core::RngCore};

/// A BIP340 Schnorr signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// The x-coordinate of the signature's public nonce. The nonce point always has an even
    /// y-coordinate.
    pub R: XOnly,
    /// The challenge _response_ part of the signature.
    pub s: Scalar<Zero>,
}

impl Signature {
    /// Serializes the signature as 64 bytes -- First the 32-byte nonce
    /// x-coordinate and then the 32-byte challenge response scalar.
    /// # Examples
    /// ```
    /// # let signature = kfun_schnorr::Signature::random(&mut rand::thread_rng());
    /// let bytes = signature.to_bytes();
    /// assert_eq!(signature.R.as_bytes(), &bytes[..32]);
    /// assert_eq!(signature.s.to_bytes(), bytes[32..]);
    /// ```
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[0..32].copy_from_slice(self.R.as_bytes());
        bytes[32..64].copy_from_slice(&self.s.to_bytes());
        bytes
    }

    /// Gets a reference to the signature components as a tuple.
    pub fn as_tuple(&self) -> (&XOnly, &Scalar<Zero>) {
        (&self.R, &self.s)
    }

    /// Generates a uniformly distributed signature. It will be valid for an
    /// infinite number of messages on every key but computationally you will
    /// never be able to find one! Useful for testing.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        Signature {
            R: XOnly::random(rng),
            s: Scalar::<NonZero>::random(rng).mark_zero(),
        }
    }

    /// Deserializes a signature from the byte representation produced by [`to_bytes`].
    ///
    /// This returns `None` if the first 32 bytes are not the x-coordinate of a point on the curve
    /// or the last 32 bytes are not less than the curve order. Such a signature could never verify
    /// so it is rejected when it is parsed.
    ///
    /// # Examples
    /// ```
    /// # use kfun_schnorr::Signature;
    /// # let bytes = [0u8;64];
    /// match Signature::from_bytes(bytes) {
    ///     Some(signature) => println!("the bytes were a valid encoding of a signature!"),
    ///     None => eprintln!("the bytes did *not* encode a valid signature"),
    /// }
    /// ```
    ///
    /// [`to_bytes`]: crate::Signature::to_bytes
    pub fn from_bytes(bytes: [u8; 64]) -> Option<Self> {
        Some(Signature {
            R: XOnly::from_slice(&bytes[0..32])?,
            s: Scalar::from_slice(&bytes[32..64])?,
        })
    }
}

kfun::impl_fromstr_deserialize! {
    name => "secp256k1 Schnorr signature",
    fn from_bytes(bytes: [u8;64]) -> Option<Signature> {
        Signature::from_bytes(bytes)
    }
}

kfun::impl_display_debug_serialize! {
    fn to_bytes(signature: &Signature) -> [u8;64] {
        signature.to_bytes()
    }
}
