//! Arithmetic modulo the group order n.
//!
//! Values are always fully reduced and stored as four little-endian 64-bit limbs.
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// n in little-endian limbs
pub(crate) const ORDER: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// 2^256 - n
const NEG_ORDER: [u64; 3] = [0x402D_A173_2FC9_BEBF, 0x4551_2319_50B7_5FC4, 0x1];

/// floor(n / 2)
const HALF_ORDER: [u64; 4] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

/// An integer modulo the group order.
#[derive(Clone, Copy, Default)]
pub struct Scalar(pub(crate) [u64; 4]);

impl Scalar {
    pub const ZERO: Self = Self([0, 0, 0, 0]);
    pub const ONE: Self = Self([1, 0, 0, 0]);
    pub const MINUS_ONE: Self = Self([ORDER[0] - 1, ORDER[1], ORDER[2], ORDER[3]]);

    pub fn from_u64(int: u64) -> Self {
        Self([int, 0, 0, 0])
    }

    /// Reads a big-endian integer, reducing it if necessary. The returned `Choice` is set when the
    /// input was not less than n.
    pub fn from_bytes_overflow(bytes: &[u8; 32]) -> (Self, Choice) {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let start = 32 - (i + 1) * 8;
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[start..start + 8]);
            *limb = u64::from_be_bytes(word);
        }
        let (reduced, borrow) = sub_limbs(&limbs, &ORDER);
        let overflow = Choice::from((borrow ^ 1) as u8);
        (
            Self(select_limbs(&limbs, &reduced, overflow)),
            overflow,
        )
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, limb) in self.0.iter().rev().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    pub fn is_zero(&self) -> Choice {
        (self.0[0] | self.0[1] | self.0[2] | self.0[3]).ct_eq(&0)
    }

    /// Whether the scalar is strictly greater than n/2.
    pub fn is_high(&self) -> Choice {
        let (_, borrow) = sub_limbs(&HALF_ORDER, &self.0);
        Choice::from(borrow as u8)
    }

    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = add_limbs(&self.0, &rhs.0);
        let (reduced, borrow) = sub_limbs(&sum, &ORDER);
        // a + b < 2n so at most one subtraction is needed
        let use_reduced = Choice::from((carry | (borrow ^ 1)) as u8);
        Self(select_limbs(&sum, &reduced, use_reduced))
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        let (diff, borrow) = sub_limbs(&self.0, &rhs.0);
        let (wrapped, _) = add_limbs(&diff, &ORDER);
        Self(select_limbs(
            &diff,
            &wrapped,
            Choice::from(borrow as u8),
        ))
    }

    pub fn negate(&self) -> Self {
        Self::ZERO.sub(self)
    }

    pub fn conditional_negate(&mut self, choice: Choice) {
        let negated = self.negate();
        self.conditional_assign(&negated, choice);
    }

    pub fn mul(&self, rhs: &Self) -> Self {
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
        reduce_wide(wide)
    }

    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Raises the scalar to the power `2^k`
    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Inverts the scalar. The inverse of zero is zero.
    pub fn invert(&self) -> Self {
        // Using an addition chain from
        // https://briansmith.org/ecc-inversion-addition-chains-01#secp256k1_scalar_inversion
        let x_1 = *self;
        let x_10 = self.pow2k(1);
        let x_11 = x_10.mul(&x_1);
        let x_101 = x_10.mul(&x_11);
        let x_111 = x_10.mul(&x_101);
        let x_1001 = x_10.mul(&x_111);
        let x_1011 = x_10.mul(&x_1001);
        let x_1101 = x_10.mul(&x_1011);

        let x6 = x_1101.pow2k(2).mul(&x_1011);
        let x8 = x6.pow2k(2).mul(&x_11);
        let x14 = x8.pow2k(6).mul(&x6);
        let x28 = x14.pow2k(14).mul(&x14);
        let x56 = x28.pow2k(28).mul(&x28);

        #[rustfmt::skip]
        let res = x56
            .pow2k(56).mul(&x56)
            .pow2k(14).mul(&x14)
            .pow2k(3).mul(&x_101)
            .pow2k(4).mul(&x_111)
            .pow2k(4).mul(&x_101)
            .pow2k(5).mul(&x_1011)
            .pow2k(4).mul(&x_1011)
            .pow2k(4).mul(&x_111)
            .pow2k(5).mul(&x_111)
            .pow2k(6).mul(&x_1101)
            .pow2k(4).mul(&x_101)
            .pow2k(3).mul(&x_111)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_101)
            .pow2k(10).mul(&x_111)
            .pow2k(4).mul(&x_111)
            .pow2k(9).mul(&x8)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_1011)
            .pow2k(4).mul(&x_1101)
            .pow2k(5).mul(&x_11)
            .pow2k(6).mul(&x_1101)
            .pow2k(10).mul(&x_1101)
            .pow2k(4).mul(&x_1001)
            .pow2k(6).mul(&x_1)
            .pow2k(8).mul(&x6);

        res
    }

    /// `self + n` as a big-endian 256-bit integer, or `None` if the sum doesn't fit.
    pub fn add_order_var(&self) -> Option<[u8; 32]> {
        let (sum, carry) = add_limbs(&self.0, &ORDER);
        if carry != 0 {
            return None;
        }
        Some(Scalar(sum).to_bytes())
    }

    /// The 4-bit window at `index` (0 is least significant).
    pub(crate) fn nibble(&self, index: usize) -> u8 {
        ((self.0[index / 16] >> ((index % 16) * 4)) & 0xf) as u8
    }

    /// Bits `[offset, offset + count)` as an integer. `count` must be less than 32.
    pub(crate) fn bits_var(&self, offset: usize, count: usize) -> u32 {
        let limb = offset / 64;
        let shift = offset % 64;
        let mut word = self.0[limb] >> shift;
        if shift + count > 64 && limb + 1 < 4 {
            word |= self.0[limb + 1] << (64 - shift);
        }
        (word & ((1u64 << count) - 1)) as u32
    }
}

fn select_limbs(a: &[u64; 4], b: &[u64; 4], choice: Choice) -> [u64; 4] {
    [
        u64::conditional_select(&a[0], &b[0], choice),
        u64::conditional_select(&a[1], &b[1], choice),
        u64::conditional_select(&a[2], &b[2], choice),
        u64::conditional_select(&a[3], &b[3], choice),
    ]
}

fn add_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], u64) {
    let mut r = [0u64; 4];
    let mut carry = 0u64;
    for i in 0..4 {
        let t = a[i] as u128 + b[i] as u128 + carry as u128;
        r[i] = t as u64;
        carry = (t >> 64) as u64;
    }
    (r, carry)
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

/// Replaces `hi * 2^256 + lo` with `hi * (2^256 - n) + lo`.
fn fold(wide: &[u64; 8]) -> [u64; 8] {
    let mut r = [0u64; 8];
    r[..4].copy_from_slice(&wide[..4]);
    for i in 0..4 {
        let mut carry = 0u128;
        for j in 0..3 {
            let t = r[i + j] as u128 + wide[4 + i] as u128 * NEG_ORDER[j] as u128 + carry;
            r[i + j] = t as u64;
            carry = t >> 64;
        }
        for limb in r.iter_mut().skip(i + 3) {
            let t = *limb as u128 + carry;
            *limb = t as u64;
            carry = t >> 64;
        }
    }
    r
}

fn reduce_wide(wide: [u64; 8]) -> Scalar {
    // each fold shrinks the value by ~127 bits: 512 -> 386 -> 260 -> 257 -> 256
    let mut folded = wide;
    for _ in 0..4 {
        folded = fold(&folded);
    }
    let lo = [folded[0], folded[1], folded[2], folded[3]];
    let (reduced, borrow) = sub_limbs(&lo, &ORDER);
    Scalar(select_limbs(
        &reduced,
        &lo,
        Choice::from(borrow as u8),
    ))
}

impl zeroize::Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize()
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(select_limbs(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl core::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for byte in self.to_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
