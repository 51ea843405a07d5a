#![allow(non_snake_case)]
use core::str::FromStr;
use kfun_ecdsa::{
    ECDSA, RecoverableSignature, RecoveryId, Signature,
    fun::{ECPrivKey, Point, hash::sha256, hex},
};

fn privkey(n: u8) -> ECPrivKey {
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    ECPrivKey::from_bytes(bytes).unwrap()
}

#[test]
fn satoshi_nakamoto() {
    let ecdsa = ECDSA::default();
    let message = sha256(b"Satoshi Nakamoto");
    let sig = ecdsa.sign_recoverable(privkey(1).secret(), &message).unwrap();
    let expected = Signature::from_str("934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d82442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5").unwrap();
    assert_eq!(sig.signature, expected);
    assert_eq!(sig.recovery_id.to_u8(), 1);
    assert_eq!(
        hex::encode(&sig.signature.to_der()),
        "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"
    );
    assert_eq!(ecdsa.recover(&message, &sig).unwrap(), privkey(1).pubkey());
}

#[test]
fn key_two_message_one() {
    let ecdsa = ECDSA::default();
    let mut message = [0u8; 32];
    message[31] = 1;
    let expected = "c840daecb9253d6c7f21d3a5663267dab258058d2fd86ba8574df59176131d7a0b792a5254e5b2cb88ef5bc8dca5c4f96de35505f6c464c42425619fa88e12a2";
    for _ in 0..3 {
        let sig = ecdsa.sign(privkey(2).secret(), &message).unwrap();
        assert_eq!(hex::encode(&sig.to_bytes()), expected);
    }

    let public_key = Point::from_str("02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5").unwrap();
    let sig = RecoverableSignature::from_compact(
        hex::decode_array::<64>(expected).unwrap(),
        RecoveryId::from_u8(1).unwrap(),
    )
    .unwrap();
    assert!(ecdsa.verify(&public_key, &message, &sig.signature));
    assert_eq!(ecdsa.recover(&message, &sig), Ok(public_key));
}

#[test]
fn tampered_signature_never_verifies() {
    let ecdsa = ECDSA::verify_only();
    let mut message = [0u8; 32];
    message[31] = 1;
    let public_key = privkey(2).pubkey();
    let bytes = hex::decode_array::<64>("c840daecb9253d6c7f21d3a5663267dab258058d2fd86ba8574df59176131d7a0b792a5254e5b2cb88ef5bc8dca5c4f96de35505f6c464c42425619fa88e12a2").unwrap();
    assert!(ecdsa.verify(&public_key, &message, &Signature::from_bytes(bytes).unwrap()));
    for i in 0..64 {
        let mut tampered = bytes;
        tampered[i] ^= 0x40;
        if let Some(sig) = Signature::from_bytes(tampered) {
            assert!(!ecdsa.verify(&public_key, &message, &sig));
        }
    }
}
