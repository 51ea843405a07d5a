use crate::Signature;
use kfun::{Error, secp256k1::ecdsa};

impl From<Signature> for ecdsa::Signature {
    fn from(sig: Signature) -> Self {
        match ecdsa::Signature::from_compact(sig.to_bytes().as_ref()) {
            Ok(sig) => sig,
            Err(_) => unreachable!("non-zero scalars always make a valid compact signature"),
        }
    }
}

/// libsecp256k1 parses compact signatures with a zero `r` or `s`. Those fail with
/// [`Error::ZeroScalar`].
impl TryFrom<ecdsa::Signature> for Signature {
    type Error = Error;

    fn try_from(sig: ecdsa::Signature) -> Result<Self, Self::Error> {
        Signature::from_bytes(sig.serialize_compact()).ok_or(Error::ZeroScalar)
    }
}
