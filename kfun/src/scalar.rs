//! Scalar arithmetic (integers mod the secp256k1 group order)
use crate::{backend, hash::HashInto, marker::*};
use core::{
    marker::PhantomData,
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};
use digest::{self, generic_array::typenum::U32};
use rand_core::RngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// A secp256k1 scalar (an integer mod the curve order)
///
/// A `Scalar` represents an integer modulo the curve order `n` where
///
/// `n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141`
///
/// Scalars are used as secret keys, nonces and signature components. Multiplying a scalar by the
/// generator [`G`] is cheap but recovering the scalar from the resulting point is the discrete
/// logarithm problem.
///
/// ```
/// use kfun::{G, Scalar, op};
/// let x = Scalar::random(&mut rand::thread_rng());
/// let X = op::mul_base(&x);
/// ```
///
/// # Markers
///
/// `Z` is a [`ZeroChoice`] tracking whether the scalar might be zero. By default scalars are
/// [`NonZero`]. Adding or subtracting two scalars always gives a [`Zero`] marked result since the
/// result may be zero. Multiplying two `NonZero` scalars gives a `NonZero` scalar because the order is
/// prime.
///
/// All arithmetic runs in constant time.
///
/// [`G`]: crate::G
/// [`ZeroChoice`]: crate::marker::ZeroChoice
/// [`NonZero`]: crate::marker::NonZero
/// [`Zero`]: crate::marker::Zero
pub struct Scalar<Z = NonZero>(pub(crate) backend::Scalar, PhantomData<Z>);

impl<Z> Copy for Scalar<Z> {}

impl<Z> Clone for Scalar<Z> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Z> core::hash::Hash for Scalar<Z> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state)
    }
}

impl<Z> Scalar<Z> {
    /// Serializes the scalar to its 32-byte big-endian representation
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Creates a scalar from 32 big-endian encoded bytes. If the bytes represent an integer greater
    /// than or equal to the curve order then it returns `None`. If the scalar is marked `NonZero`
    /// then it will also return `None` it it's the zero scalar.
    ///
    /// # Example
    /// ```
    /// use kfun::{Scalar, marker::*};
    /// assert!(Scalar::<Zero>::from_bytes([0u8; 32]).is_some());
    /// // NonZero scalar's can't be zero
    /// assert!(Scalar::<NonZero>::from_bytes([0u8; 32]).is_none());
    /// // >= curve order
    /// assert!(Scalar::<Zero>::from_bytes([255u8; 32]).is_none());
    /// ```
    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self>
    where
        Z: ZeroChoice,
    {
        let (inner, overflow) = backend::Scalar::from_bytes_overflow(&bytes);
        if bool::from(overflow) || (!Z::is_zero() && bool::from(inner.is_zero())) {
            return None;
        }
        Some(Self::from_inner(inner))
    }

    /// Decode a 32 byte long slice to a scalar.
    ///
    /// Essentially [`from_bytes`] but checks that the slice is `32` bytes long first.
    ///
    /// [`from_bytes`]: Self::from_bytes
    pub fn from_slice(slice: &[u8]) -> Option<Self>
    where
        Z: ZeroChoice,
    {
        let bytes: [u8; 32] = slice.try_into().ok()?;
        Self::from_bytes(bytes)
    }

    /// Negates the scalar in-place if `cond` is true.
    pub fn conditional_negate(&mut self, cond: bool) {
        self.0.conditional_negate(Choice::from(cond as u8))
    }

    /// Returns whether the scalar is greater than the `curve_order`/2.
    pub fn is_high(&self) -> bool {
        self.0.is_high().into()
    }

    /// Returns true if the scalar is equal to zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero().into()
    }

    pub(crate) fn from_inner(inner: backend::Scalar) -> Self {
        Scalar(inner, PhantomData)
    }

    /// Mark the scalar as possibly being `Zero` (even though it isn't).
    ///
    /// This is useful in accumulator variables where although the initial value is non-zero, every
    /// sum addition after that might make it zero so it's necessary to start off with `Zero` marked
    /// scalar.
    pub fn mark_zero(self) -> Scalar<Zero> {
        Scalar::from_inner(self.0)
    }
}

impl Scalar<NonZero> {
    /// Returns the multiplicative inverse of the scalar modulo the curve order.
    /// # Example
    ///
    /// ```
    /// use kfun::Scalar;
    /// let a = Scalar::random(&mut rand::thread_rng());
    /// let a_inverse = a.invert();
    /// assert_eq!(a * a_inverse, Scalar::one());
    /// ```
    pub fn invert(&self) -> Self {
        Self::from_inner(self.0.invert())
    }

    /// Returns the integer `1` as a `Scalar`.
    pub fn one() -> Self {
        Self::from_inner(backend::Scalar::ONE)
    }

    /// Returns the integer -1 (modulo the curve order) as a `Scalar`.
    pub fn minus_one() -> Self {
        Self::from_inner(backend::Scalar::MINUS_ONE)
    }

    /// Creates a scalar from a non-zero `u32`.
    pub fn from_non_zero_u32(int: core::num::NonZeroU32) -> Self {
        Self::from_inner(backend::Scalar::from_u64(int.get() as u64))
    }

    /// Generates a random scalar from randomness taken from a caller provided
    /// cryptographically secure random number generator.
    ///
    /// Out of range or zero samples are rejected and redrawn so the result is uniform.
    /// # Example
    /// ```
    /// use kfun::{Scalar, op};
    /// let secret_scalar = Scalar::random(&mut rand::thread_rng());
    /// let public_point = op::mul_base(&secret_scalar);
    /// ```
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        loop {
            rng.fill_bytes(&mut bytes);
            if let Some(scalar) = Self::from_bytes(bytes) {
                return scalar;
            }
        }
    }
}

impl Scalar<Zero> {
    /// Converts a scalar marked with `Zero` to `NonZero`.
    ///
    /// Returns `None` in the case that the scalar was in fact zero.
    pub fn non_zero(self) -> Option<Scalar<NonZero>> {
        if self.is_zero() {
            None
        } else {
            Some(Scalar::from_inner(self.0))
        }
    }

    /// Returns the zero scalar.
    pub fn zero() -> Self {
        Self::from_inner(backend::Scalar::ZERO)
    }

    /// Converts 32 bytes into a scalar by reducing it modulo the curve order `n`.
    /// # Example
    /// ```
    /// use kfun::{Scalar, hex, marker::*};
    /// let scalar = Scalar::<Zero>::from_bytes_mod_order(*b"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx");
    /// assert_eq!(scalar.to_bytes(), *b"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx");
    /// let scalar_overflowed = Scalar::<Zero>::from_bytes_mod_order(
    ///     hex::decode_array("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364142")
    ///         .unwrap(),
    /// );
    /// assert_eq!(scalar_overflowed, Scalar::one())
    /// ```
    pub fn from_bytes_mod_order(bytes: [u8; 32]) -> Self {
        Self::from_bytes_with_overflow(bytes).0
    }

    /// Like [`from_bytes_mod_order`] but also reports whether the input was not less than the curve
    /// order and had to be reduced.
    ///
    /// # Example
    /// ```
    /// use kfun::{Scalar, marker::*};
    /// let (scalar, overflowed) = Scalar::<Zero>::from_bytes_with_overflow([0xff; 32]);
    /// assert!(overflowed);
    /// assert_eq!(Scalar::<Zero>::from_bytes(scalar.to_bytes()), Some(scalar));
    /// ```
    ///
    /// [`from_bytes_mod_order`]: Self::from_bytes_mod_order
    pub fn from_bytes_with_overflow(bytes: [u8; 32]) -> (Self, bool) {
        let (inner, overflow) = backend::Scalar::from_bytes_overflow(&bytes);
        (Self::from_inner(inner), overflow.into())
    }

    /// Exactly like [`from_bytes_mod_order`] except
    /// it operates on a 32-byte slice rather than an array.  If the slice is
    /// not 32 bytes long then the function returns `None`.
    ///
    /// [`from_bytes_mod_order`]: crate::Scalar::from_bytes_mod_order
    pub fn from_slice_mod_order(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 32] = slice.try_into().ok()?;
        Some(Self::from_bytes_mod_order(bytes))
    }

    /// Converts the output of a 32-byte hash into a scalar by reducing it modulo the curve order.
    /// # Example
    /// ```
    /// use digest::Digest;
    /// use kfun::Scalar;
    /// let mut hash = sha2::Sha256::default();
    /// hash.update(b"Chancellor on brink of second bailout for banks".as_ref());
    /// let scalar = Scalar::from_hash(hash);
    /// # assert_eq!(
    /// #     scalar.to_bytes(),
    /// #     kfun::hex::decode_array("8131e6f4b45754f2c90bd06688ceeabc0c45055460729928b4eecf11026a9e2d").unwrap()
    /// # );
    /// ```
    pub fn from_hash(hash: impl digest::FixedOutput<OutputSize = U32>) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(hash.finalize_fixed().as_slice());
        Self::from_bytes_mod_order(bytes)
    }
}

impl From<u32> for Scalar<Zero> {
    fn from(int: u32) -> Self {
        Self::from_inner(backend::Scalar::from_u64(int as u64))
    }
}

impl<Z1, Z2> PartialEq<Scalar<Z2>> for Scalar<Z1> {
    fn eq(&self, rhs: &Scalar<Z2>) -> bool {
        self.0.ct_eq(&rhs.0).into()
    }
}

impl<Z> Eq for Scalar<Z> {}

impl<Z> ConditionallySelectable for Scalar<Z> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self::from_inner(backend::Scalar::conditional_select(&a.0, &b.0, choice))
    }
}

impl<Z> ConstantTimeEq for Scalar<Z> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

crate::impl_fromstr_deserialize! {
    name => "secp256k1 scalar",
    fn from_bytes<Z: ZeroChoice>(bytes: [u8;32]) -> Option<Scalar<Z> > {
        Scalar::from_bytes(bytes)
    }
}

crate::impl_display_debug_serialize! {
    fn to_bytes<Z>(scalar: &Scalar<Z>) -> [u8;32] {
        scalar.to_bytes()
    }
}

impl<Z> HashInto for Scalar<Z> {
    fn hash_into(self, hash: &mut impl digest::Update) {
        hash.update(&self.to_bytes())
    }
}

/// Overwrites the scalar with zero. A `NonZero` scalar must not be used afterwards so this is only
/// for wiping secrets that are about to be dropped, e.g. through [`zeroize::Zeroizing`].
impl<Z> zeroize::Zeroize for Scalar<Z> {
    fn zeroize(&mut self) {
        self.0.zeroize()
    }
}

impl Default for Scalar<Zero> {
    fn default() -> Self {
        Scalar::zero()
    }
}

impl Default for Scalar<NonZero> {
    fn default() -> Self {
        Self::one()
    }
}

impl<Z> Neg for Scalar<Z> {
    type Output = Scalar<Z>;

    fn neg(self) -> Self::Output {
        Scalar::from_inner(self.0.negate())
    }
}

impl<Z> Neg for &Scalar<Z> {
    type Output = Scalar<Z>;

    fn neg(self) -> Self::Output {
        Scalar::from_inner(self.0.negate())
    }
}

macro_rules! impl_scalar_binop {
    ($trait:ident, $method:ident, $inner:ident, <$z1:ident, $z2:ident> => $out:ty $(where $($bound:tt)+)?) => {
        impl<$z1, $z2> $trait<Scalar<$z2>> for Scalar<$z1> $(where $($bound)+)? {
            type Output = Scalar<$out>;

            fn $method(self, rhs: Scalar<$z2>) -> Self::Output {
                Scalar::from_inner(self.0.$inner(&rhs.0))
            }
        }

        impl<$z1, $z2> $trait<&Scalar<$z2>> for Scalar<$z1> $(where $($bound)+)? {
            type Output = Scalar<$out>;

            fn $method(self, rhs: &Scalar<$z2>) -> Self::Output {
                Scalar::from_inner(self.0.$inner(&rhs.0))
            }
        }

        impl<$z1, $z2> $trait<Scalar<$z2>> for &Scalar<$z1> $(where $($bound)+)? {
            type Output = Scalar<$out>;

            fn $method(self, rhs: Scalar<$z2>) -> Self::Output {
                Scalar::from_inner(self.0.$inner(&rhs.0))
            }
        }

        impl<$z1, $z2> $trait<&Scalar<$z2>> for &Scalar<$z1> $(where $($bound)+)? {
            type Output = Scalar<$out>;

            fn $method(self, rhs: &Scalar<$z2>) -> Self::Output {
                Scalar::from_inner(self.0.$inner(&rhs.0))
            }
        }
    };
}

impl_scalar_binop!(Add, add, add, <Z1, Z2> => Zero);
impl_scalar_binop!(Sub, sub, sub, <Z1, Z2> => Zero);
impl_scalar_binop!(Mul, mul, mul, <Z1, Z2> => <Z1 as DecideZero<Z2>>::Out where Z1: DecideZero<Z2>);

impl<Z> AddAssign<Scalar<Z>> for Scalar<Zero> {
    fn add_assign(&mut self, rhs: Scalar<Z>) {
        *self = *self + rhs;
    }
}

impl<Z> AddAssign<&Scalar<Z>> for Scalar<Zero> {
    fn add_assign(&mut self, rhs: &Scalar<Z>) {
        *self = *self + rhs;
    }
}

impl<Z> SubAssign<Scalar<Z>> for Scalar<Zero> {
    fn sub_assign(&mut self, rhs: Scalar<Z>) {
        *self = *self - rhs;
    }
}

impl<Z> SubAssign<&Scalar<Z>> for Scalar<Zero> {
    fn sub_assign(&mut self, rhs: &Scalar<Z>) {
        *self = *self - rhs;
    }
}

impl<Z> MulAssign<Scalar<NonZero>> for Scalar<Z> {
    fn mul_assign(&mut self, rhs: Scalar<NonZero>) {
        *self = Scalar::from_inner(self.0.mul(&rhs.0));
    }
}

impl<Z> MulAssign<&Scalar<NonZero>> for Scalar<Z> {
    fn mul_assign(&mut self, rhs: &Scalar<NonZero>) {
        *self = Scalar::from_inner(self.0.mul(&rhs.0));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    #[test]
    fn scalar_serialization_roundtrip() {
        let original = Scalar::random(&mut rand::thread_rng());
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, format!("\"{}\"", original));
        let deserialized: Scalar = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, original);
        let zero_json = serde_json::to_string(&Scalar::zero()).unwrap();
        assert!(serde_json::from_str::<Scalar>(&zero_json).is_err());
    }

    #[test]
    fn random() {
        let scalar_1 = Scalar::random(&mut rand::thread_rng());
        let scalar_2 = Scalar::random(&mut rand::thread_rng());
        assert_ne!(scalar_1, scalar_2);
    }

    #[test]
    fn invert() {
        let x = Scalar::random(&mut rand::thread_rng());
        assert!(x * x.invert() == Scalar::one());
    }

    #[test]
    fn neg() {
        let x = Scalar::random(&mut rand::thread_rng());
        let neg_x = -x;
        assert_eq!(x + neg_x, Scalar::zero());
    }

    #[test]
    fn sub() {
        let x = Scalar::random(&mut rand::thread_rng());
        assert_eq!(x - x, Scalar::zero());
    }

    #[test]
    fn one() {
        assert_eq!(Scalar::one(), Scalar::from(1u32));
        assert_eq!(Scalar::minus_one(), -Scalar::one());
        assert_eq!(Scalar::one() * Scalar::minus_one(), Scalar::minus_one());
    }

    #[test]
    fn zero() {
        assert_eq!(Scalar::zero(), Scalar::from(0u32));
        assert!(Scalar::zero().non_zero().is_none());
        assert!(Scalar::one().mark_zero().non_zero().is_some());
    }

    #[test]
    fn conditional_negation() {
        let mut x = Scalar::random(&mut rand::thread_rng());
        let original = x;
        x.conditional_negate(false);
        assert_eq!(x, original);
        x.conditional_negate(true);
        assert_eq!(x, -original);
        // exactly one of x and -x is high
        assert_ne!(x.is_high(), original.is_high());
    }

    #[test]
    fn from_str_and_display() {
        let hex = "8131e6f4b45754f2c90bd06688ceeabc0c45055460729928b4eecf11026a9e2d";
        let scalar = Scalar::<NonZero>::from_str(hex).unwrap();
        assert_eq!(format!("{}", scalar), hex);
        assert!(Scalar::<NonZero>::from_str(&"00".repeat(32)).is_err());
        assert!(Scalar::<Zero>::from_str(&"00".repeat(32)).is_ok());
        assert!(Scalar::<Zero>::from_str(&"ff".repeat(32)).is_err());
    }

    #[test]
    fn slices() {
        let bytes = [7u8; 32];
        assert!(Scalar::<NonZero>::from_slice(&bytes[..31]).is_none());
        assert_eq!(
            Scalar::<NonZero>::from_slice(&bytes[..]),
            Scalar::<NonZero>::from_bytes(bytes)
        );
        assert!(Scalar::<Zero>::from_slice_mod_order(&[0xff; 33]).is_none());
    }
}
