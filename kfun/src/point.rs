use crate::{
    Scalar, XOnly,
    backend::{FieldElement, GroupElement, GroupElementJacobian},
    hash::HashInto,
    marker::*,
    op,
};
use core::{
    marker::PhantomData,
    ops::{Add, Mul, Neg, Sub},
};
use rand_core::RngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// A point on the secp256k1 elliptic curve.
///
/// A `Point<NonZero>` (the default) is always a valid curve point other than the point at infinity.
/// A `Point<Zero>` may also be the point at infinity (the identity of the group). Sums and
/// differences of points are always marked `Zero` since they may cancel out.
///
/// Public keys are `Point`s. They serialize as 33-byte compressed encodings by default and can also
/// be written and read in the 65-byte uncompressed encoding.
///
/// # Example
///
/// ```
/// use kfun::{G, Point, Scalar, op};
/// let x = Scalar::random(&mut rand::thread_rng());
/// let X: Point = op::mul_base(&x);
/// let bytes = X.to_bytes();
/// assert_eq!(Point::from_bytes(bytes), Some(X));
/// ```
pub struct Point<Z = NonZero>(pub(crate) GroupElement, PhantomData<Z>);

impl<Z> Copy for Point<Z> {}

impl<Z> Clone for Point<Z> {
    fn clone(&self) -> Self {
        *self
    }
}

impl Point<NonZero> {
    /// The standard generator. See [`G`](crate::G).
    pub const GENERATOR: Self = Point::from_inner(GroupElement::GENERATOR);

    /// Decodes a 33-byte compressed point.
    ///
    /// The first byte must be `0x02` (even y) or `0x03` (odd y) and the remaining 32 bytes must be
    /// the big-endian encoding of an x-coordinate on the curve.
    ///
    /// # Example
    /// ```
    /// use kfun::{Point, hex};
    /// let bytes = hex::decode_array("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap();
    /// let point = Point::from_bytes(bytes).unwrap();
    /// assert_eq!(&point, kfun::G);
    /// ```
    pub fn from_bytes(bytes: [u8; 33]) -> Option<Self> {
        let y_odd = match bytes[0] {
            0x02 => false,
            0x03 => true,
            _ => return None,
        };
        let mut x = [0u8; 32];
        x.copy_from_slice(&bytes[1..]);
        Self::from_x_parity(x, y_odd)
    }

    /// Decodes a 65-byte uncompressed point (`0x04 || x || y`).
    pub fn from_bytes_uncompressed(bytes: [u8; 65]) -> Option<Self> {
        if bytes[0] != 0x04 {
            return None;
        }
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[1..33]);
        y.copy_from_slice(&bytes[33..]);
        let x = FieldElement::from_bytes(&x)?;
        let y = FieldElement::from_bytes(&y)?;
        GroupElement::from_xy(x, y).map(Self::from_inner)
    }

    /// Decodes a compressed (33 byte) or uncompressed (65 byte) point from a slice.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        match slice.len() {
            33 => Self::from_bytes(slice.try_into().ok()?),
            65 => Self::from_bytes_uncompressed(slice.try_into().ok()?),
            _ => None,
        }
    }

    /// Lifts an x-coordinate to the point with the given y parity. Returns `None` if `x` is not the
    /// x-coordinate of any point on the curve.
    pub fn from_x_parity(x: [u8; 32], y_odd: bool) -> Option<Self> {
        let x = FieldElement::from_bytes(&x)?;
        Option::<GroupElement>::from(GroupElement::from_x_parity(&x, Choice::from(y_odd as u8)))
            .map(Self::from_inner)
    }

    /// Lifts 32 x-only bytes to the point with that x-coordinate and an even y-coordinate.
    pub fn from_xonly_bytes(x: [u8; 32]) -> Option<Self> {
        Self::from_x_parity(x, false)
    }

    /// Interprets a scalar as an x-coordinate (optionally adding the curve order to it first) and
    /// lifts it to the point with the given y parity.
    ///
    /// This is how ECDSA public key recovery turns `r` back into a nonce point. Returns `None` if
    /// `x + n` overflows the field or if there is no point with that x-coordinate.
    pub fn from_scalar_x<Z>(x: &Scalar<Z>, add_order: bool, y_odd: bool) -> Option<Self> {
        let bytes = if add_order {
            x.0.add_order_var()?
        } else {
            x.to_bytes()
        };
        Self::from_x_parity(bytes, y_odd)
    }

    /// The 33-byte compressed encoding of the point.
    pub fn to_bytes(&self) -> [u8; 33] {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x02 | self.0.y().is_odd().unwrap_u8();
        bytes[1..].copy_from_slice(&self.0.x().to_bytes());
        bytes
    }

    /// The 65-byte uncompressed encoding of the point.
    pub fn to_bytes_uncompressed(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0] = 0x04;
        bytes[1..33].copy_from_slice(&self.0.x().to_bytes());
        bytes[33..].copy_from_slice(&self.0.y().to_bytes());
        bytes
    }

    /// The big-endian x and y coordinates.
    pub fn coordinates(&self) -> ([u8; 32], [u8; 32]) {
        (self.0.x().to_bytes(), self.0.y().to_bytes())
    }

    /// The x-coordinate of the point.
    pub fn to_xonly_bytes(&self) -> [u8; 32] {
        self.0.x().to_bytes()
    }

    /// Converts the point to an [`XOnly`] by dropping the y-coordinate.
    pub fn to_xonly(&self) -> XOnly {
        XOnly::from_point(self)
    }

    /// The x-coordinate reduced modulo the curve order along with whether it had to be reduced.
    ///
    /// ECDSA's `r` is the first element of this for the nonce point.
    pub fn x_scalar(&self) -> (Scalar<Zero>, bool) {
        Scalar::from_bytes_with_overflow(self.0.x().to_bytes())
    }

    /// Whether the y-coordinate is even.
    pub fn is_y_even(&self) -> bool {
        self.0.y().is_even().into()
    }

    /// Negates the point if necessary so that its y-coordinate is even. The returned `bool` is true
    /// if negation was needed.
    ///
    /// # Example
    /// ```
    /// use kfun::{Point, op};
    /// let point = Point::random(&mut rand::thread_rng());
    /// let (point_with_even_y, was_negated) = point.into_point_with_even_y();
    /// assert!(point_with_even_y.is_y_even());
    /// assert_eq!(point_with_even_y == point, !was_negated);
    /// ```
    pub fn into_point_with_even_y(self) -> (Point, bool) {
        let needs_negation = !self.is_y_even();
        (self.conditional_negate(needs_negation), needs_negation)
    }

    /// Multiplies the generator by `x` and returns the even-y representative of the result. The
    /// returned `bool` is true if the result had to be negated, in which case the caller should
    /// negate `x` too so that it stays the discrete log.
    pub fn even_y_from_scalar_mul(x: &Scalar) -> (Point, bool) {
        op::mul_base(x).into_point_with_even_y()
    }

    /// Samples a random point by multiplying the generator by a random scalar.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        op::mul_base(&Scalar::random(rng))
    }
}

impl Point<Zero> {
    /// The point at infinity.
    pub fn zero() -> Self {
        Self::from_inner(GroupElement::INFINITY)
    }

    /// Converts to a `NonZero` point. Returns `None` for the point at infinity.
    pub fn non_zero(self) -> Option<Point> {
        if self.is_zero() {
            None
        } else {
            Some(Point::from_inner(self.0))
        }
    }
}

impl<Z> Point<Z> {
    pub(crate) const fn from_inner(inner: GroupElement) -> Self {
        Point(inner, PhantomData)
    }

    pub(crate) fn from_jacobian(point: &GroupElementJacobian) -> Self {
        Point(point.to_affine(), PhantomData)
    }

    /// Whether this is the point at infinity.
    pub fn is_zero(&self) -> bool {
        self.0.is_infinity()
    }

    /// Marks the point as possibly being the point at infinity.
    pub fn mark_zero(self) -> Point<Zero> {
        Point::from_inner(self.0)
    }

    /// Negates the point if `cond` is true.
    #[must_use]
    pub fn conditional_negate(&self, cond: bool) -> Self {
        let mut inner = self.0;
        inner.conditional_negate(Choice::from(cond as u8));
        Self::from_inner(inner)
    }

    fn compressed_or_zero(&self) -> [u8; 33] {
        if self.is_zero() {
            return [0u8; 33];
        }
        Point::<NonZero>::from_inner(self.0).to_bytes()
    }
}

impl Default for Point<Zero> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<Z1, Z2> PartialEq<Point<Z2>> for Point<Z1> {
    fn eq(&self, rhs: &Point<Z2>) -> bool {
        self.0.ct_eq(&rhs.0).into()
    }
}

impl<Z> Eq for Point<Z> {}

impl<Z> core::hash::Hash for Point<Z> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.compressed_or_zero().hash(state)
    }
}

impl<Z> ConditionallySelectable for Point<Z> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self::from_inner(GroupElement::conditional_select(&a.0, &b.0, choice))
    }
}

impl<Z> HashInto for Point<Z> {
    /// Adds the compressed encoding to the hash. The point at infinity is 33 zero bytes.
    fn hash_into(self, hash: &mut impl digest::Update) {
        hash.update(&self.compressed_or_zero())
    }
}

impl<Z> core::fmt::Debug for Point<Z> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.is_zero() {
            return write!(f, "Point<Zero>(infinity)");
        }
        write!(f, "Point(")?;
        for byte in self.compressed_or_zero() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

crate::impl_display_serialize! {
    fn to_bytes(point: &Point) -> [u8;33] {
        point.to_bytes()
    }
}

crate::impl_fromstr_deserialize! {
    name => "secp256k1 point",
    fn from_bytes(bytes: [u8;33]) -> Option<Point> {
        Point::from_bytes(bytes)
    }
}

impl<Z> Neg for Point<Z> {
    type Output = Point<Z>;

    fn neg(self) -> Self::Output {
        Point::from_inner(self.0.negate())
    }
}

impl<Z> Neg for &Point<Z> {
    type Output = Point<Z>;

    fn neg(self) -> Self::Output {
        Point::from_inner(self.0.negate())
    }
}

macro_rules! impl_point_binop {
    ($trait:ident, $method:ident, $op:path) => {
        impl<Z1, Z2> $trait<Point<Z2>> for Point<Z1> {
            type Output = Point<Zero>;

            fn $method(self, rhs: Point<Z2>) -> Self::Output {
                $op(&self, &rhs)
            }
        }

        impl<Z1, Z2> $trait<&Point<Z2>> for Point<Z1> {
            type Output = Point<Zero>;

            fn $method(self, rhs: &Point<Z2>) -> Self::Output {
                $op(&self, rhs)
            }
        }

        impl<Z1, Z2> $trait<Point<Z2>> for &Point<Z1> {
            type Output = Point<Zero>;

            fn $method(self, rhs: Point<Z2>) -> Self::Output {
                $op(self, &rhs)
            }
        }

        impl<Z1, Z2> $trait<&Point<Z2>> for &Point<Z1> {
            type Output = Point<Zero>;

            fn $method(self, rhs: &Point<Z2>) -> Self::Output {
                $op(self, rhs)
            }
        }
    };
}

impl_point_binop!(Add, add, op::point_add);
impl_point_binop!(Sub, sub, op::point_sub);

impl<Z1, Z2> Mul<&Point<Z2>> for &Scalar<Z1>
where
    Z1: DecideZero<Z2>,
{
    type Output = Point<Z1::Out>;

    /// Constant time scalar multiplication. See [`op::scalar_mul_point`].
    fn mul(self, rhs: &Point<Z2>) -> Self::Output {
        op::scalar_mul_point(self, rhs)
    }
}

impl<Z1, Z2> Mul<Point<Z2>> for Scalar<Z1>
where
    Z1: DecideZero<Z2>,
{
    type Output = Point<Z1::Out>;

    fn mul(self, rhs: Point<Z2>) -> Self::Output {
        op::scalar_mul_point(&self, &rhs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{G, hex};
    use core::str::FromStr;

    #[test]
    fn generator_encodings() {
        assert_eq!(
            hex::encode(&G.to_bytes()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            hex::encode(&G.to_bytes_uncompressed()),
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
        let two_g = op::mul_base(&Scalar::from_non_zero_u32(core::num::NonZeroU32::new(2).unwrap()));
        assert_eq!(
            hex::encode(&two_g.to_bytes()),
            "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5"
        );
        assert_eq!(G + G, two_g);
    }

    #[test]
    fn encodings_roundtrip() {
        let point = Point::random(&mut rand::thread_rng());
        assert_eq!(Point::from_bytes(point.to_bytes()), Some(point));
        assert_eq!(Point::from_bytes_uncompressed(point.to_bytes_uncompressed()), Some(point));
        assert_eq!(Point::from_slice(&point.to_bytes()[..]), Some(point));
        assert_eq!(Point::from_slice(&point.to_bytes_uncompressed()[..]), Some(point));
        assert_eq!(Point::from_slice(&point.to_bytes()[..32]), None);
    }

    #[test]
    fn invalid_encodings() {
        let mut bytes = G.to_bytes();
        bytes[0] = 0x04;
        assert!(Point::from_bytes(bytes).is_none());
        // x^3 + 7 is not a square for x = 5
        let mut bytes = [0u8; 33];
        bytes[0] = 0x02;
        bytes[32] = 5;
        assert!(Point::from_bytes(bytes).is_none());
        // x >= p
        let mut bytes = [0xffu8; 33];
        bytes[0] = 0x02;
        assert!(Point::from_bytes(bytes).is_none());
        // flipping the low bit of y takes the point off the curve
        let mut uncompressed = G.to_bytes_uncompressed();
        uncompressed[64] ^= 1;
        assert!(Point::from_bytes_uncompressed(uncompressed).is_none());
        assert!(Point::from_str("zz").is_err());
    }

    #[test]
    fn even_y() {
        let point = Point::random(&mut rand::thread_rng());
        let (even, negated) = point.into_point_with_even_y();
        assert!(even.is_y_even());
        assert_eq!(even, point.conditional_negate(negated));
        assert_eq!(Point::from_xonly_bytes(point.to_xonly_bytes()), Some(even));
        assert_ne!(point.is_y_even(), (-point).is_y_even());
    }

    #[test]
    fn zero_point() {
        let zero = Point::zero();
        let point = Point::random(&mut rand::thread_rng());
        assert!(zero.is_zero());
        assert!(zero.non_zero().is_none());
        assert_eq!(point + zero, point);
        assert_eq!(zero + point, point);
        assert_eq!(point - point, zero);
        assert_eq!(format!("{:?}", zero), "Point<Zero>(infinity)");
    }

    #[test]
    fn scalar_x_lifting() {
        let point = Point::random(&mut rand::thread_rng());
        let (x, overflow) = point.x_scalar();
        // overflow happens with probability ~2^-128
        assert!(!overflow);
        let lifted = Point::from_scalar_x(&x, false, !point.is_y_even()).unwrap();
        assert_eq!(lifted, point);
        // n - 1 + n overflows 256 bits
        assert!(Point::from_scalar_x(&Scalar::minus_one(), true, false).is_none());
    }

    #[test]
    fn scalar_mul_operator() {
        let x = Scalar::random(&mut rand::thread_rng());
        assert_eq!(&x * G, op::mul_base(&x));
        let H = Point::random(&mut rand::thread_rng());
        assert_eq!(x * H, op::scalar_mul_point(&x, &H));
    }

    #[test]
    fn display_fromstr() {
        let hex = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";
        let point = Point::from_str(hex).unwrap();
        assert_eq!(format!("{}", point), hex);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let point = Point::random(&mut rand::thread_rng());
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, format!("\"{}\"", point));
        assert_eq!(serde_json::from_str::<Point>(&json).unwrap(), point);
    }
}
