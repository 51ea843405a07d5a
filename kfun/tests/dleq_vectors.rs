#![allow(non_snake_case)]
use core::str::FromStr;
use kfun::{
    Point, Scalar,
    dleq::{DLEQProof, Dleq},
    op,
};

// Generated with the ECDSA adaptor nonce function of libsecp256k1-zkp given 32 zero bytes of
// auxiliary data. The challenge hashes X, Y, Z, R1 then R2.
const X_SECRET: &str = "43e60a3dee8da7464ded39dfe28ff61dc5a051f4d6e35db0fff69b924491297e";
const Y_HEX: &str = "02d2c965d70a620dd914b0bef4b948e47f2ecbb4214ddba081e17d79a99044a8a6";
const X_HEX: &str = "023b25e941a38a841e0db1001cc19525f4fcdb60f94de902c74df4630a825a2c42";
const Z_HEX: &str = "029c179fba5fe0622b777fcaf1ca8585149a9af9a3607d0d8267e0dd083dca11a4";
const PROOF: &str = "6accae17a37b32f84a82aafe82de0c8acdf1b05f0c7baac4ae6daf08581a33b0b7f1e36adc422433c71bc3a7addbe4271dcd4f148e16fc64ffe3037ea934a592";

fn statement() -> (Scalar, Point, Point, Point) {
    (
        Scalar::from_str(X_SECRET).unwrap(),
        Point::from_str(Y_HEX).unwrap(),
        Point::from_str(X_HEX).unwrap(),
        Point::from_str(Z_HEX).unwrap(),
    )
}

#[test]
fn prove_matches_known_proof() {
    let (x, Y, X, Z) = statement();
    assert_eq!(op::mul_base(&x), X);
    assert_eq!(op::scalar_mul_point(&x, &Y), Z);
    let proof = Dleq::default().prove(&x, &Y, &X, &Z).unwrap();
    assert_eq!(proof.to_string(), PROOF);
}

#[test]
fn verify_known_proof() {
    let (_, Y, X, Z) = statement();
    let dleq = Dleq::default();
    let proof = DLEQProof::from_str(PROOF).unwrap();
    assert!(dleq.verify(&proof, &Y, &X, &Z));
    // swapping the roles of the two generators changes the statement
    assert!(!dleq.verify(&proof, &X, &Y, &Z));
    assert!(!dleq.verify(&proof, &Y, &Z, &X));
}
