use kfun::{Point, Scalar, marker::*};

/// A one-time encrypted Schnorr signature or "adaptor signature".
///
/// Sometimes also called a "pre-signature". Encodes to 65 bytes: the x-coordinate of `R`, then
/// `s_hat` and finally one byte holding `needs_negation`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EncryptedSignature {
    /// The `R` point in the signature. Its y-coordinate is always even.
    pub R: Point,
    /// The _one-time encrypted_ `s` value of the signature.
    pub s_hat: Scalar<Zero>,
    /// Whether the decryptor should negate their decryption key prior to decryption.
    /// This exists as a side effect of using "x-only" (EvenY) signature nonces.
    pub needs_negation: bool,
}

impl EncryptedSignature {
    /// The 65-byte encoding.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.R.to_xonly_bytes());
        bytes[32..64].copy_from_slice(&self.s_hat.to_bytes());
        bytes[64] = self.needs_negation as u8;
        bytes
    }

    /// Decodes the 65-byte encoding.
    ///
    /// Returns `None` if `R` isn't on the curve, `s_hat` overflows the curve order or the last byte
    /// is anything other than `0` or `1`.
    pub fn from_bytes(bytes: [u8; 65]) -> Option<Self> {
        let mut R = [0u8; 32];
        R.copy_from_slice(&bytes[0..32]);
        let needs_negation = match bytes[64] {
            0 => false,
            1 => true,
            _ => return None,
        };
        Some(EncryptedSignature {
            R: Point::from_xonly_bytes(R)?,
            s_hat: Scalar::from_slice(&bytes[32..64])?,
            needs_negation,
        })
    }
}

kfun::impl_display_debug_serialize! {
    fn to_bytes(encrypted_signature: &EncryptedSignature) -> [u8;65] {
        encrypted_signature.to_bytes()
    }
}

kfun::impl_fromstr_deserialize! {
    name => "Schnorr adaptor signature",
    fn from_bytes(bytes: [u8;65]) -> Option<EncryptedSignature> {
        EncryptedSignature::from_bytes(bytes)
    }
}
