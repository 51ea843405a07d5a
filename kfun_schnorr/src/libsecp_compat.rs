use kfun::{hex::HexError, secp256k1::schnorr};

impl From<crate::Signature> for schnorr::Signature {
    fn from(sig: crate::Signature) -> Self {
        match schnorr::Signature::from_slice(sig.to_bytes().as_ref()) {
            Ok(sig) => sig,
            Err(_) => unreachable!("a signature is always 64 bytes"),
        }
    }
}

/// libsecp256k1 doesn't check the parts of a Schnorr signature when parsing it. Signatures whose
/// `R` isn't on the curve or whose `s` overflows can't be converted.
impl TryFrom<schnorr::Signature> for crate::Signature {
    type Error = HexError;

    fn try_from(sig: schnorr::Signature) -> Result<Self, Self::Error> {
        crate::Signature::from_bytes(sig.serialize()).ok_or(HexError::InvalidEncoding)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn signature_roundtrip() {
        let sig = crate::Signature::random(&mut rand::thread_rng());
        let secp_sig = schnorr::Signature::from(sig);
        assert_eq!(crate::Signature::try_from(secp_sig), Ok(sig));

        let mut bytes = sig.to_bytes();
        bytes[32..].copy_from_slice(&[0xff; 32]);
        let overflowing = schnorr::Signature::from_slice(&bytes).unwrap();
        assert!(crate::Signature::try_from(overflowing).is_err());
    }
}
