use alloc::vec::Vec;
use kfun::{Error, Scalar};

/// An ECDSA signature.
///
/// Both components are non-zero scalars so a parsed `Signature` is always well formed. Whether `s`
/// is in the lower half of the curve order is up to whoever created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// The x-coordinate of the nonce point reduced modulo the curve order.
    pub R_x: Scalar,
    /// The signature scalar.
    pub s: Scalar,
}

impl Signature {
    /// The 64-byte compact encoding `r || s`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[0..32].copy_from_slice(&self.R_x.to_bytes()[..]);
        bytes[32..64].copy_from_slice(&self.s.to_bytes()[..]);
        bytes
    }

    /// Decodes the 64-byte compact encoding. Returns `None` if either half is zero or not less
    /// than the curve order.
    pub fn from_bytes(bytes: [u8; 64]) -> Option<Self> {
        Some(Self {
            R_x: Scalar::from_slice(&bytes[0..32])?,
            s: Scalar::from_slice(&bytes[32..64])?,
        })
    }

    /// The components as a tuple.
    pub fn as_tuple(&self) -> (&Scalar, &Scalar) {
        (&self.R_x, &self.s)
    }

    /// Whether `s` is in the lower half of the curve order as [BIP-146] requires.
    ///
    /// [BIP-146]: https://github.com/bitcoin/bips/blob/master/bip-0146.mediawiki#low_s
    pub fn is_low_s(&self) -> bool {
        !self.s.is_high()
    }

    /// Replaces `s` with `-s` if it is high. Returns whether it did so.
    ///
    /// Both `(r, s)` and `(r, -s)` verify so normalizing doesn't change what the signature signs.
    pub fn normalize_s(&mut self) -> bool {
        let high = self.s.is_high();
        self.s.conditional_negate(high);
        high
    }

    /// Strict DER encoding as used in Bitcoin transactions.
    pub fn to_der(&self) -> Vec<u8> {
        let r = der_integer(&self.R_x.to_bytes());
        let s = der_integer(&self.s.to_bytes());
        let mut der = Vec::with_capacity(6 + r.len() + s.len());
        der.push(0x30);
        der.push((4 + r.len() + s.len()) as u8);
        for int in [r, s] {
            der.push(0x02);
            der.push(int.len() as u8);
            der.extend_from_slice(&int);
        }
        der
    }

    /// Parses a strict [BIP-66] DER encoding.
    ///
    /// Rejects anything with padding, negative integers, long form lengths or trailing bytes.
    ///
    /// [BIP-66]: https://github.com/bitcoin/bips/blob/master/bip-0066.mediawiki
    pub fn from_der(der: &[u8]) -> Option<Self> {
        let (&tag, rest) = der.split_first()?;
        let (&len, body) = rest.split_first()?;
        if tag != 0x30 || len as usize != body.len() {
            return None;
        }
        let (R_x, rest) = parse_der_integer(body)?;
        let (s, rest) = parse_der_integer(rest)?;
        if !rest.is_empty() {
            return None;
        }
        Some(Self {
            R_x: Scalar::from_bytes(R_x)?,
            s: Scalar::from_bytes(s)?,
        })
    }
}

/// Minimal big-endian two's complement encoding of a positive 256-bit integer.
fn der_integer(bytes: &[u8; 32]) -> Vec<u8> {
    let start = bytes.iter().position(|&byte| byte != 0).unwrap_or(31);
    let mut int = Vec::with_capacity(33);
    if bytes[start] & 0x80 != 0 {
        int.push(0x00);
    }
    int.extend_from_slice(&bytes[start..]);
    int
}

fn parse_der_integer(input: &[u8]) -> Option<([u8; 32], &[u8])> {
    let (&tag, rest) = input.split_first()?;
    let (&len, rest) = rest.split_first()?;
    let len = len as usize;
    if tag != 0x02 || len == 0 || len > 33 || rest.len() < len {
        return None;
    }
    let (int, rest) = rest.split_at(len);
    // negative
    if int[0] & 0x80 != 0 {
        return None;
    }
    // padded
    if len > 1 && int[0] == 0x00 && int[1] & 0x80 == 0 {
        return None;
    }
    let int = if int[0] == 0x00 && len > 1 { &int[1..] } else { int };
    if int.len() > 32 {
        return None;
    }
    let mut bytes = [0u8; 32];
    bytes[32 - int.len()..].copy_from_slice(int);
    Some((bytes, rest))
}

kfun::impl_fromstr_deserialize! {
    name => "secp256k1 ECDSA signature",
    fn from_bytes(bytes: [u8;64]) -> Option<Signature> {
        Signature::from_bytes(bytes)
    }
}

kfun::impl_display_debug_serialize! {
    fn to_bytes(sig: &Signature) -> [u8;64] {
        sig.to_bytes()
    }
}

/// Tells public key recovery which of the up to four points with x-coordinate `r` was the nonce.
///
/// Bit 0 is set if the nonce point's y-coordinate is odd. Bit 1 is set if its x-coordinate was
/// not less than the curve order and so was reduced to get `r`, which happens with negligible
/// probability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Builds the id from its two flags.
    pub fn new(y_odd: bool, x_overflowed: bool) -> Self {
        Self(y_odd as u8 | (x_overflowed as u8) << 1)
    }

    /// Returns `None` unless `id` is 0, 1, 2 or 3.
    pub fn from_u8(id: u8) -> Option<Self> {
        (id < 4).then_some(Self(id))
    }

    /// The id as a number between 0 and 3.
    pub fn to_u8(self) -> u8 {
        self.0
    }

    /// Whether the nonce point has an odd y-coordinate.
    pub fn is_y_odd(self) -> bool {
        self.0 & 1 == 1
    }

    /// Whether the nonce point's x-coordinate is `r + n` rather than `r`.
    pub fn is_x_overflowed(self) -> bool {
        self.0 & 2 == 2
    }
}

impl TryFrom<u8> for RecoveryId {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_u8(id).ok_or(Error::InvalidRecoveryId)
    }
}

impl From<RecoveryId> for u8 {
    fn from(id: RecoveryId) -> Self {
        id.0
    }
}

/// A signature that also records enough about its nonce to recover the public key that made it.
///
/// By convention the recovery id is carried next to the 64 compact bytes rather than inside them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecoverableSignature {
    /// The plain signature.
    pub signature: Signature,
    /// Identifies the nonce point.
    pub recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// The compact signature bytes and the recovery id.
    pub fn to_compact(&self) -> ([u8; 64], RecoveryId) {
        (self.signature.to_bytes(), self.recovery_id)
    }

    /// The inverse of [`to_compact`](Self::to_compact).
    pub fn from_compact(bytes: [u8; 64], recovery_id: RecoveryId) -> Option<Self> {
        Some(Self {
            signature: Signature::from_bytes(bytes)?,
            recovery_id,
        })
    }

    /// Negates `s` if it is high, flipping the y parity of the recovery id to match.
    pub fn normalize_s(&mut self) -> bool {
        let flipped = self.signature.normalize_s();
        if flipped {
            self.recovery_id = RecoveryId(self.recovery_id.0 ^ 1);
        }
        flipped
    }
}

impl From<RecoverableSignature> for Signature {
    fn from(recoverable: RecoverableSignature) -> Self {
        recoverable.signature
    }
}
