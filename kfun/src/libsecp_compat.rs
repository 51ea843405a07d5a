use crate::{ECPrivKey, Point, Scalar, XOnly};
use secp256k1_0_30::{PublicKey, SecretKey, XOnlyPublicKey};

impl From<Scalar> for SecretKey {
    fn from(scalar: Scalar) -> Self {
        match SecretKey::from_slice(scalar.to_bytes().as_ref()) {
            Ok(secret_key) => secret_key,
            Err(_) => unreachable!("non-zero scalars are valid secret keys"),
        }
    }
}

impl From<SecretKey> for Scalar {
    fn from(sk: SecretKey) -> Self {
        match Scalar::from_bytes(sk.secret_bytes()) {
            Some(scalar) => scalar,
            None => unreachable!("SecretKey is never zero"),
        }
    }
}

impl From<&ECPrivKey> for SecretKey {
    fn from(privkey: &ECPrivKey) -> Self {
        SecretKey::from(*privkey.secret())
    }
}

impl From<SecretKey> for ECPrivKey {
    fn from(sk: SecretKey) -> Self {
        ECPrivKey::new(Scalar::from(sk))
    }
}

impl From<PublicKey> for Point {
    fn from(pk: PublicKey) -> Self {
        match Point::from_bytes(pk.serialize()) {
            Some(point) => point,
            None => unreachable!("libsecp256k1 public keys are valid points"),
        }
    }
}

impl From<Point> for PublicKey {
    fn from(point: Point) -> Self {
        match PublicKey::from_slice(point.to_bytes().as_ref()) {
            Ok(pk) => pk,
            Err(_) => unreachable!("points are valid public keys"),
        }
    }
}

impl From<XOnlyPublicKey> for XOnly {
    fn from(pk: XOnlyPublicKey) -> Self {
        match XOnly::from_bytes(pk.serialize()) {
            Some(xonly) => xonly,
            None => unreachable!("libsecp256k1 x-only keys are valid"),
        }
    }
}

impl From<XOnly> for XOnlyPublicKey {
    fn from(xonly: XOnly) -> Self {
        match XOnlyPublicKey::from_slice(xonly.as_bytes()) {
            Ok(pk) => pk,
            Err(_) => unreachable!("x-only keys are checked when they are created"),
        }
    }
}
