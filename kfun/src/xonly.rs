use crate::{Point, Scalar, hash::HashInto, op};
use core::cmp::Ordering;
use rand_core::RngCore;

/// The x-coordinate of a point on the curve, standing for the point with that x-coordinate and an
/// even y-coordinate.
///
/// This is the BIP340 public key format. An `XOnly` can only be constructed from bytes that are the
/// x-coordinate of some curve point so a bad key is rejected when it is parsed rather than when a
/// signature is verified against it.
///
/// # Example
/// ```
/// use kfun::{XOnly, hex};
/// let bytes = hex::decode_array("eefdea4cdb677750a420fee807eacf21eb9898ae79b9768766e4faa04a2d4a34").unwrap();
/// // no point has this x-coordinate
/// assert!(XOnly::from_bytes(bytes).is_none());
/// ```
#[derive(Clone, Copy)]
pub struct XOnly {
    bytes: [u8; 32],
    // the even-y point so lifting never has to fail
    point: Point,
}

impl XOnly {
    /// Decodes a 32-byte big-endian x-coordinate. Returns `None` if it isn't the x-coordinate of
    /// a point on the curve.
    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        let point = Point::from_xonly_bytes(bytes)?;
        Some(XOnly { bytes, point })
    }

    /// Calls [`from_bytes`](Self::from_bytes) on a slice. Returns `None` if its length isn't 32.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        Self::from_bytes(slice.try_into().ok()?)
    }

    pub(crate) fn from_point(point: &Point) -> Self {
        XOnly {
            bytes: point.to_xonly_bytes(),
            point: point.into_point_with_even_y().0,
        }
    }

    /// Generates a random `XOnly`.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        Point::random(rng).to_xonly()
    }

    /// Returns a reference to the x-coordinate bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Converts to the x-coordinate bytes.
    pub fn into_bytes(self) -> [u8; 32] {
        self.bytes
    }

    /// Lifts the x-coordinate to the point with an even y-coordinate.
    pub fn to_point(&self) -> Point {
        self.point
    }

    /// Multiplies `G` by `x` and compresses the result to an `XOnly`.
    ///
    /// `x` is negated in place if the product had an odd y-coordinate so that it remains the
    /// discrete log of [`to_point`](Self::to_point).
    ///
    /// # Example
    /// ```
    /// use kfun::{Scalar, XOnly, op};
    /// let original = Scalar::random(&mut rand::thread_rng());
    /// let mut secret_key = original;
    /// let public_key = XOnly::from_scalar_mul(&mut secret_key);
    /// assert_eq!(op::mul_base(&secret_key), public_key.to_point());
    /// ```
    pub fn from_scalar_mul(x: &mut Scalar) -> Self {
        let X = op::mul_base(x);
        x.conditional_negate(!X.is_y_even());
        X.to_xonly()
    }
}

// the point is determined by the bytes so only they take part in comparisons
impl PartialEq for XOnly {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for XOnly {}

impl core::hash::Hash for XOnly {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state)
    }
}

impl PartialOrd for XOnly {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XOnly {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl HashInto for XOnly {
    fn hash_into(self, hash: &mut impl digest::Update) {
        hash.update(&self.bytes)
    }
}

impl AsRef<[u8]> for XOnly {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<XOnly> for Point {
    fn from(xonly: XOnly) -> Self {
        xonly.to_point()
    }
}

crate::impl_display_debug_serialize! {
    fn to_bytes(xonly: &XOnly) -> &[u8;32] {
        xonly.as_bytes()
    }
}

crate::impl_fromstr_deserialize! {
    name => "BIP340 x-only public key",
    fn from_bytes(bytes: [u8;32]) -> Option<XOnly> {
        XOnly::from_bytes(bytes)
    }
}
