use core::fmt;

/// Errors from operations whose algebraic preconditions were not met.
///
/// Parsing never produces these. Decoding functions return `Option` (or [`HexError`] for hex) and
/// verification returns a `bool`.
///
/// [`HexError`]: crate::hex::HexError
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The nonce function produced no usable nonce within [`MAX_NONCE_RETRIES`] attempts.
    ///
    /// [`MAX_NONCE_RETRIES`]: crate::nonce::MAX_NONCE_RETRIES
    NonceExhausted,
    /// A scalar that must be non-zero was zero.
    ZeroScalar,
    /// A point that must be finite was the point at infinity.
    PointAtInfinity,
    /// A recovery id was not in `0..4`.
    InvalidRecoveryId,
    /// No public key could be recovered from the signature.
    RecoveryFailed,
    /// A recovered secret did not correspond to the expected public key.
    KeyMismatch,
    /// A signature's nonce did not match the nonce of the encrypted signature it was meant to
    /// come from.
    NonceMismatch,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            NonceExhausted => write!(f, "nonce function did not produce a valid nonce"),
            ZeroScalar => write!(f, "scalar was zero"),
            PointAtInfinity => write!(f, "point was the point at infinity"),
            InvalidRecoveryId => write!(f, "recovery id must be less than 4"),
            RecoveryFailed => write!(f, "failed to recover a public key from the signature"),
            KeyMismatch => write!(f, "recovered secret does not match the public key"),
            NonceMismatch => write!(f, "signature nonce does not match the encrypted signature"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
