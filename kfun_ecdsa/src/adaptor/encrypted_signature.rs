use kfun::{Point, Scalar, dleq::DLEQProof, marker::*};

/// `PointNonce` is a [`NonZero`] Point that also has an x-coordinate that is NonZero
/// when reduced modulo the curve order.
///
/// [`NonZero`]: kfun::marker::NonZero
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PointNonce {
    /// The point.
    pub point: Point,
    /// Its x-coordinate reduced modulo the curve order. This becomes the `r` of the decrypted
    /// signature.
    pub x_scalar: Scalar,
}

impl PointNonce {
    /// Returns `None` if the x-coordinate of `point` is a multiple of the curve order.
    pub fn from_point(point: Point) -> Option<Self> {
        let x_scalar = point.x_scalar().0.non_zero()?;
        Some(PointNonce { point, x_scalar })
    }
}

kfun::impl_fromstr_deserialize! {
    name => "compressed secp256k1 point",
    fn from_bytes(bytes: [u8;33]) -> Option<PointNonce> {
        Point::from_bytes(bytes).and_then(PointNonce::from_point)
    }
}

kfun::impl_display_debug_serialize! {
    fn to_bytes(point_nonce: &PointNonce) -> [u8;33] {
        point_nonce.point.to_bytes()
    }
}

/// An "encrypted" ECDSA signature A.K.A. adaptor signature.
///
/// Encodes to 162 bytes: `R || R_hat || s_hat || proof`. This is the same layout as
/// libsecp256k1-zkp's ECDSA adaptor signatures. It can only be created by
/// [`Adaptor::encrypted_sign`].
///
/// [`Adaptor::encrypted_sign`]: crate::adaptor::Adaptor::encrypted_sign
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EncryptedSignature {
    /// `k * Y`. Its x-coordinate is the `r` of the decrypted signature.
    pub R: PointNonce,
    /// `k * G`.
    pub R_hat: Point,
    /// `k⁻¹(m + r * x)`.
    pub s_hat: Scalar,
    /// Shows `R` and `R_hat` have the same discrete log with respect to `Y` and `G`.
    pub proof: DLEQProof,
}

impl EncryptedSignature {
    /// The 162-byte encoding.
    pub fn to_bytes(&self) -> [u8; 162] {
        let mut bytes = [0u8; 162];
        bytes[0..33].copy_from_slice(&self.R.point.to_bytes());
        bytes[33..66].copy_from_slice(&self.R_hat.to_bytes());
        bytes[66..98].copy_from_slice(&self.s_hat.to_bytes());
        bytes[98..162].copy_from_slice(&self.proof.to_bytes());
        bytes
    }

    /// Decodes the 162-byte encoding.
    ///
    /// Returns `None` if a point isn't on the curve, `s_hat` is zero or a scalar overflows the curve
    /// order.
    pub fn from_bytes(bytes: [u8; 162]) -> Option<Self> {
        let mut proof = [0u8; 64];
        proof.copy_from_slice(&bytes[98..162]);
        Some(EncryptedSignature {
            R: PointNonce::from_point(Point::from_slice(&bytes[0..33])?)?,
            R_hat: Point::from_slice(&bytes[33..66])?,
            s_hat: Scalar::<NonZero>::from_slice(&bytes[66..98])?,
            proof: DLEQProof::from_bytes(proof)?,
        })
    }
}

kfun::impl_display_debug_serialize! {
    fn to_bytes(es: &EncryptedSignature) -> [u8;162] {
        es.to_bytes()
    }
}

kfun::impl_fromstr_deserialize! {
    name => "ECDSA adaptor signature",
    fn from_bytes(bytes: [u8;162]) -> Option<EncryptedSignature> {
        EncryptedSignature::from_bytes(bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::string::ToString;
    use crate::adaptor::Adaptor;
    use core::str::FromStr;

    fn encrypted_signature() -> EncryptedSignature {
        let secret_key = Scalar::random(&mut rand::thread_rng());
        let encryption_key = Point::random(&mut rand::thread_rng());
        Adaptor::default()
            .encrypted_sign(&secret_key, &encryption_key, b"hello world you are beautiful!!!")
            .unwrap()
    }

    #[test]
    fn byte_encoding() {
        let encrypted_signature = encrypted_signature();
        let bytes = encrypted_signature.to_bytes();
        assert_eq!(EncryptedSignature::from_bytes(bytes), Some(encrypted_signature));
        assert_eq!(
            EncryptedSignature::from_str(&encrypted_signature.to_string()),
            Ok(encrypted_signature)
        );

        let mut bad_prefix = bytes;
        bad_prefix[33] = 0x05;
        assert!(EncryptedSignature::from_bytes(bad_prefix).is_none());
        let mut zero_s_hat = bytes;
        zero_s_hat[66..98].copy_from_slice(&[0u8; 32]);
        assert!(EncryptedSignature::from_bytes(zero_s_hat).is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn encrypted_signature_serde_roundtrip() {
        let encrypted_signature = encrypted_signature();
        let serialized = serde_json::to_string(&encrypted_signature).unwrap();
        assert_eq!(serialized.len(), 162 * 2 + 2);
        let deserialized: EncryptedSignature = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, encrypted_signature);
    }
}
