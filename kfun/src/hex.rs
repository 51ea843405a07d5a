//! Hex encoding and decoding for the fixed length encodings used throughout the crate.
use alloc::{string::String, vec::Vec};
use core::fmt;

/// Error returned when a hex string can't be turned into the requested value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexError {
    /// The string contained a non-hex character or had an odd length.
    InvalidHex,
    /// The string decoded to the wrong number of bytes for the target type.
    InvalidLength,
    /// The bytes were well formed but did not encode a valid value of the target type.
    InvalidEncoding,
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use HexError::*;
        match self {
            InvalidHex => write!(f, "invalid hex string"),
            InvalidLength => write!(f, "hex string had the wrong length"),
            InvalidEncoding => write!(f, "hex value did not encode the expected type"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HexError {}

#[doc(hidden)]
pub fn hex_val(c: u8) -> Result<u8, HexError> {
    match c {
        b'A'..=b'F' => Ok(c - b'A' + 10),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'0'..=b'9' => Ok(c - b'0'),
        _ => Err(HexError::InvalidHex),
    }
}

/// Encode some bytes as a lowercase hex `String`.
///
/// # Examples
/// ```
/// use kfun::{G, hex};
/// let G_hex = hex::encode(G.to_bytes().as_ref());
/// assert_eq!(G_hex, "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
/// ```
pub fn encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push(DIGITS[(byte >> 4) as usize] as char);
        hex.push(DIGITS[(byte & 0x0f) as usize] as char);
    }
    hex
}

/// Decode a hex string into a `Vec<u8>`.
///
/// # Examples
/// ```
/// use kfun::{G, hex};
/// let G_bytes = hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap();
/// assert_eq!(&G_bytes[..], G.to_bytes().as_ref());
/// ```
pub fn decode(hex: &str) -> Result<Vec<u8>, HexError> {
    if hex.len() % 2 != 0 {
        return Err(HexError::InvalidHex);
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| Ok(hex_val(pair[0])? << 4 | hex_val(pair[1])?))
        .collect()
}

/// Decode a hex string into a fixed length array.
///
/// # Examples
/// ```
/// use kfun::{G, hex};
/// let G_bytes: [u8; 33] = hex::decode_array("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap();
/// assert_eq!(G_bytes, G.to_bytes());
/// ```
pub fn decode_array<const N: usize>(hex: &str) -> Result<[u8; N], HexError> {
    if hex.len() % 2 != 0 {
        return Err(HexError::InvalidHex);
    }
    if hex.len() != N * 2 {
        return Err(HexError::InvalidLength);
    }
    let mut bytes = [0u8; N];
    for (pair, byte) in hex.as_bytes().chunks(2).zip(bytes.iter_mut()) {
        *byte = hex_val(pair[0])? << 4 | hex_val(pair[1])?
    }
    Ok(bytes)
}
