//! Field arithmetic modulo p = 2^256 - 2^32 - 2^9 - 2^8 - 2^7 - 2^6 - 2^4 - 1
//!
//! Elements are four little-endian 64-bit limbs holding any value in `[0, 2^256)`. Values in
//! `[p, 2^256)` are valid (but redundant) representatives and only get reduced by
//! [`FieldElement::normalize`]. Everything that observes the value (bytes, equality, parity) normalizes
//! first.
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// p in little-endian limbs
const MODULUS: [u64; 4] = [
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// 2^256 mod p
const FOLD: u64 = 0x1_0000_03D1;

/// An element in the finite field used for curve coordinates.
#[derive(Clone, Copy)]
pub struct FieldElement([u64; 4]);

impl FieldElement {
    /// Zero element.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// The `b` in `y^2 = x^3 + b`.
    pub const CURVE_B: Self = Self([7, 0, 0, 0]);

    pub(crate) const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    /// Parses a 32-byte big-endian integer. Returns `None` if it is not less than `p`.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let limbs = limbs_from_be(bytes);
        let (_, borrow) = sub_limbs(&limbs, &MODULUS);
        // the subtraction only borrows when the value was below p
        if borrow == 1 { Some(Self(limbs)) } else { None }
    }

    /// Returns the canonical 32-byte big-endian encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        let limbs = self.normalize().0;
        let mut bytes = [0u8; 32];
        for (i, limb) in limbs.iter().rev().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    /// Fully reduces the element into `[0, p)`.
    pub fn normalize(&self) -> Self {
        let (reduced, borrow) = sub_limbs(&self.0, &MODULUS);
        // borrow == 1 means we were already below p
        Self::conditional_select(&Self(reduced), self, Choice::from(borrow as u8))
    }

    /// Whether the element is zero mod p.
    pub fn is_zero(&self) -> Choice {
        let limbs = self.normalize().0;
        (limbs[0] | limbs[1] | limbs[2] | limbs[3]).ct_eq(&0)
    }

    /// Whether the element is odd in the SEC1 sense: `self mod 2 == 1`.
    pub fn is_odd(&self) -> Choice {
        Choice::from((self.normalize().0[0] & 1) as u8)
    }

    /// Whether the element is even in the SEC1 sense: `self mod 2 == 0`.
    pub fn is_even(&self) -> Choice {
        !self.is_odd()
    }

    fn add(&self, rhs: &Self) -> Self {
        let mut r = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let t = self.0[i] as u128 + rhs.0[i] as u128 + carry as u128;
            r[i] = t as u64;
            carry = (t >> 64) as u64;
        }
        Self(fold_carry(r, carry as u128 * FOLD as u128))
    }

    fn sub(&self, rhs: &Self) -> Self {
        let (r, borrow) = sub_limbs(&self.0, &rhs.0);
        // a - b wrapped past zero by 2^256 which is congruent to FOLD
        let (r, borrow) = sub_word(r, borrow * FOLD);
        let (r, _) = sub_word(r, borrow * FOLD);
        Self(r)
    }

    /// Returns `-self`.
    pub fn negate(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Returns `2 * self`.
    pub fn double(&self) -> Self {
        self.add(self)
    }

    /// Multiplies by a small integer.
    pub fn mul_word(&self, rhs: u64) -> Self {
        let mut r = [0u64; 4];
        let mut carry = 0u128;
        for i in 0..4 {
            let t = self.0[i] as u128 * rhs as u128 + carry;
            r[i] = t as u64;
            carry = t >> 64;
        }
        Self(fold_carry(r, carry * FOLD as u128))
    }

    fn mul(&self, rhs: &Self) -> Self {
        let mut wide = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u128;
            for j in 0..4 {
                let t = wide[i + j] as u128 + self.0[i] as u128 * rhs.0[j] as u128 + carry;
                wide[i + j] = t as u64;
                carry = t >> 64;
            }
            wide[i + 4] = carry as u64;
        }
        reduce_wide(&wide)
    }

    /// Returns `self * self`.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Raises to the power `2^k`
    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Returns the multiplicative inverse of self, if self is non-zero.
    pub fn invert(&self) -> CtOption<Self> {
        // The binary representation of (p - 2) has 5 blocks of 1s, with lengths in
        // { 1, 2, 22, 223 }. Use an addition chain to calculate 2^n - 1 for each block:
        // [1], [2], 3, 6, 9, 11, [22], 44, 88, 176, 220, [223]
        let (x2, x22, x223) = self.chain_blocks();

        let res = x223
            .pow2k(23)
            .mul(&x22)
            .pow2k(5)
            .mul(self)
            .pow2k(3)
            .mul(&x2)
            .pow2k(2)
            .mul(self);

        CtOption::new(res, !self.is_zero())
    }

    /// Returns the square root of self mod p, or `None` if no square root exists.
    pub fn sqrt(&self) -> CtOption<Self> {
        // p = 3 mod 4 so the square root of a is a^((p+1)/4) when one exists. (p+1)/4 has
        // 3 blocks of 1s with lengths in { 2, 22, 223 }.
        let (x2, x22, x223) = self.chain_blocks();

        let res = x223.pow2k(23).mul(&x22).pow2k(6).mul(&x2).pow2k(2);
        let is_root = res.square().ct_eq(self);

        CtOption::new(res, is_root)
    }

    /// The `2^2-1`, `2^22-1` and `2^223-1` powers shared by the inversion and square root chains.
    fn chain_blocks(&self) -> (Self, Self, Self) {
        let x2 = self.pow2k(1).mul(self);
        let x3 = x2.pow2k(1).mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);
        (x2, x22, x223)
    }
}

/// Inverts every element of `elements` in place with a single field inversion.
///
/// All elements must be non-zero.
pub fn batch_invert(elements: &mut [FieldElement]) {
    if elements.is_empty() {
        return;
    }
    let mut acc = FieldElement::ONE;
    let mut prefix = alloc::vec::Vec::with_capacity(elements.len());
    for element in elements.iter() {
        prefix.push(acc);
        acc *= element;
    }
    let mut inv = acc.invert().unwrap_or(FieldElement::ZERO);
    for (element, prefix) in elements.iter_mut().zip(prefix).rev() {
        let next_inv = inv * *element;
        *element = inv * prefix;
        inv = next_inv;
    }
}

fn limbs_from_be(bytes: &[u8; 32]) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let start = 32 - (i + 1) * 8;
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[start..start + 8]);
        *limb = u64::from_be_bytes(word);
    }
    limbs
}

fn sub_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], u64) {
    let mut r = [0u64; 4];
    let mut borrow = 0u64;
    for i in 0..4 {
        let (d, b1) = a[i].overflowing_sub(b[i]);
        let (d, b2) = d.overflowing_sub(borrow);
        r[i] = d;
        borrow = (b1 | b2) as u64;
    }
    (r, borrow)
}

fn sub_word(a: [u64; 4], word: u64) -> ([u64; 4], u64) {
    sub_limbs(&a, &[word, 0, 0, 0])
}

/// Adds `extra` (which may exceed one limb) and folds any overflow past 2^256 back in.
fn fold_carry(limbs: [u64; 4], extra: u128) -> [u64; 4] {
    let (limbs, carry) = add_wide(limbs, extra);
    // the wrapped value is now tiny so folding again cannot overflow
    let (limbs, _) = add_wide(limbs, carry as u128 * FOLD as u128);
    limbs
}

fn add_wide(limbs: [u64; 4], extra: u128) -> ([u64; 4], u64) {
    let mut r = [0u64; 4];
    let mut carry = extra;
    for i in 0..4 {
        let t = limbs[i] as u128 + carry;
        r[i] = t as u64;
        carry = t >> 64;
    }
    (r, carry as u64)
}

fn reduce_wide(wide: &[u64; 8]) -> FieldElement {
    // lo + hi * 2^256 = lo + hi * FOLD (mod p)
    let mut r = [0u64; 4];
    let mut carry = 0u128;
    for i in 0..4 {
        let t = wide[i] as u128 + wide[i + 4] as u128 * FOLD as u128 + carry;
        r[i] = t as u64;
        carry = t >> 64;
    }
    FieldElement(fold_carry(r, carry * FOLD as u128))
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        let a = self.normalize().0;
        let b = other.normalize().0;
        a[0].ct_eq(&b[0]) & a[1].ct_eq(&b[1]) & a[2].ct_eq(&b[2]) & a[3].ct_eq(&b[3])
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Eq for FieldElement {}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl core::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "FieldElement(")?;
        for byte in self.to_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $inner:ident) => {
        impl $trait<FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $method(self, other: FieldElement) -> FieldElement {
                FieldElement::$inner(&self, &other)
            }
        }

        impl $trait<&FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $method(self, other: &FieldElement) -> FieldElement {
                FieldElement::$inner(&self, other)
            }
        }

        impl $trait<&FieldElement> for &FieldElement {
            type Output = FieldElement;

            fn $method(self, other: &FieldElement) -> FieldElement {
                FieldElement::$inner(self, other)
            }
        }

        impl $assign_trait<FieldElement> for FieldElement {
            fn $assign_method(&mut self, other: FieldElement) {
                *self = FieldElement::$inner(self, &other);
            }
        }

        impl $assign_trait<&FieldElement> for FieldElement {
            fn $assign_method(&mut self, other: &FieldElement) {
                *self = FieldElement::$inner(self, other);
            }
        }
    };
}

impl_binop!(Add, add, AddAssign, add_assign, add);
impl_binop!(Sub, sub, SubAssign, sub_assign, sub);
impl_binop!(Mul, mul, MulAssign, mul_assign, mul);

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        self.negate()
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        self.negate()
    }
}
