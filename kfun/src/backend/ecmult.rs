//! Scalar multiplication.
//!
//! Two read-only contexts hold precomputed tables. They are pure functions of the generator so a
//! single copy of each is built lazily on first use and shared by every thread.
use super::{
    group::{GroupElement, GroupElementJacobian},
    scalar::Scalar,
};
use alloc::{boxed::Box, vec::Vec};
use once_cell::race::OnceBox;
use subtle::{ConditionallySelectable, ConstantTimeEq};

/// Number of 4-bit windows in a 256-bit scalar.
const WINDOWS: usize = 64;
/// wNAF window for the generator's precomputed odd multiples.
const WINDOW_G: usize = 8;
/// wNAF window for points only known at call time.
const WINDOW_A: usize = 5;

/// Precomputed multiples of `G` for constant-time fixed-base multiplication.
///
/// Row `i` holds `j * 16^i * G` for `j` in `0..16` so `k * G` is a sum of one entry from each row
/// selected by the 4-bit windows of `k`.
pub struct ECMultGenContext {
    rows: Vec<[GroupElement; 16]>,
}

impl ECMultGenContext {
    /// Builds the table. Prefer [`ECMultGenContext::get`] which builds it once.
    pub fn new() -> Self {
        let mut points = Vec::with_capacity(WINDOWS * 16);
        let mut base = GroupElement::GENERATOR.to_jacobian();
        for _ in 0..WINDOWS {
            let mut multiple = GroupElementJacobian::INFINITY;
            for _ in 0..16 {
                points.push(multiple);
                multiple = multiple.add_var(&base);
            }
            base = base.double().double().double().double();
        }
        let affine = GroupElementJacobian::to_affine_batch(&points);
        let rows = affine
            .chunks_exact(16)
            .map(|chunk| {
                let mut row = [GroupElement::INFINITY; 16];
                row.copy_from_slice(chunk);
                row
            })
            .collect();
        Self { rows }
    }

    /// The process wide context.
    pub fn get() -> &'static Self {
        static CONTEXT: OnceBox<ECMultGenContext> = OnceBox::new();
        CONTEXT.get_or_init(|| {
            let context = Box::new(Self::new());
            tracing::debug!(entries = WINDOWS * 16, "built generator multiplication table");
            context
        })
    }

    /// Computes `scalar * G` in constant time.
    pub fn mul(&self, scalar: &Scalar) -> GroupElementJacobian {
        let mut acc = GroupElementJacobian::INFINITY;
        for (i, row) in self.rows.iter().enumerate() {
            let nibble = scalar.nibble(i);
            let mut entry = GroupElement::INFINITY;
            // touch every entry so the memory access pattern is independent of the scalar
            for (j, candidate) in row.iter().enumerate() {
                entry.conditional_assign(candidate, (j as u8).ct_eq(&nibble));
            }
            acc = acc.add_affine(&entry);
        }
        acc
    }
}

impl Default for ECMultGenContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Precomputed odd multiples of `G` for variable-time multi-scalar multiplication.
///
/// Every method here branches on its scalars. Use them only on public data such as during
/// verification.
pub struct ECMultContext {
    /// `G, 3G, 5G, ...` up to `(2^(WINDOW_G - 1) - 1) * G`
    pre_g: Vec<GroupElement>,
}

impl ECMultContext {
    /// Builds the table. Prefer [`ECMultContext::get`] which builds it once.
    pub fn new() -> Self {
        let odd = odd_multiples(&GroupElement::GENERATOR.to_jacobian(), WINDOW_G);
        Self {
            pre_g: GroupElementJacobian::to_affine_batch(&odd),
        }
    }

    /// The process wide context.
    pub fn get() -> &'static Self {
        static CONTEXT: OnceBox<ECMultContext> = OnceBox::new();
        CONTEXT.get_or_init(|| {
            let context = Box::new(Self::new());
            tracing::debug!(entries = context.pre_g.len(), "built verification multiplication table");
            context
        })
    }

    /// Computes `g_scalar * G + scalar * point`.
    pub fn double_mul(
        &self,
        g_scalar: &Scalar,
        scalar: &Scalar,
        point: &GroupElementJacobian,
    ) -> GroupElementJacobian {
        self.multi_mul(Some(g_scalar), core::iter::once((scalar, point)))
    }

    /// Computes `g_scalar * G + Σ scalar_i * point_i` with Strauss' method, sharing the doublings
    /// between all the terms.
    pub fn multi_mul<'a>(
        &self,
        g_scalar: Option<&Scalar>,
        terms: impl IntoIterator<Item = (&'a Scalar, &'a GroupElementJacobian)>,
    ) -> GroupElementJacobian {
        let terms: Vec<([i32; 257], Vec<GroupElementJacobian>)> = terms
            .into_iter()
            .filter(|(scalar, point)| !bool::from(scalar.is_zero()) && !point.is_infinity_var())
            .map(|(scalar, point)| (wnaf(scalar, WINDOW_A), odd_multiples(point, WINDOW_A)))
            .collect();
        let g_digits = g_scalar.map(|scalar| wnaf(scalar, WINDOW_G));

        let top = terms
            .iter()
            .map(|(digits, _)| digits)
            .chain(g_digits.iter())
            .filter_map(|digits| digits.iter().rposition(|&digit| digit != 0))
            .max();
        let top = match top {
            Some(top) => top,
            None => return GroupElementJacobian::INFINITY,
        };

        let mut acc = GroupElementJacobian::INFINITY;
        for bit in (0..=top).rev() {
            acc = acc.double();
            for (digits, table) in &terms {
                let digit = digits[bit];
                if digit > 0 {
                    acc = acc.add_var(&table[(digit / 2) as usize]);
                } else if digit < 0 {
                    acc = acc.add_var(&table[(-digit / 2) as usize].negate());
                }
            }
            if let Some(digits) = &g_digits {
                let digit = digits[bit];
                if digit > 0 {
                    acc = acc.add_affine_var(&self.pre_g[(digit / 2) as usize]);
                } else if digit < 0 {
                    acc = acc.add_affine_var(&self.pre_g[(-digit / 2) as usize].negate());
                }
            }
        }
        acc
    }
}

impl Default for ECMultContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes `scalar * point` in constant time using a fixed 4-bit window.
pub fn mul_const_time(scalar: &Scalar, point: &GroupElementJacobian) -> GroupElementJacobian {
    let mut table = [GroupElementJacobian::INFINITY; 16];
    for j in 1..16 {
        table[j] = table[j - 1].add(point);
    }

    let mut acc = GroupElementJacobian::INFINITY;
    for i in (0..WINDOWS).rev() {
        acc = acc.double().double().double().double();
        let nibble = scalar.nibble(i);
        let mut entry = GroupElementJacobian::INFINITY;
        for (j, candidate) in table.iter().enumerate() {
            entry.conditional_assign(candidate, (j as u8).ct_eq(&nibble));
        }
        acc = acc.add(&entry);
    }
    acc
}

/// `point, 3 * point, 5 * point, ...` with `2^(window - 2)` entries.
fn odd_multiples(point: &GroupElementJacobian, window: usize) -> Vec<GroupElementJacobian> {
    let count = 1 << (window - 2);
    let double = point.double();
    let mut multiples = Vec::with_capacity(count);
    multiples.push(*point);
    for i in 1..count {
        let next = multiples[i - 1].add_var(&double);
        multiples.push(next);
    }
    multiples
}

/// Writes `scalar` in width-`window` non-adjacent form.
///
/// Each digit is zero or odd with absolute value below `2^(window - 1)`, and `scalar = Σ digit_i * 2^i`.
/// The extra 257th digit absorbs the final carry.
fn wnaf(scalar: &Scalar, window: usize) -> [i32; 257] {
    let mut digits = [0i32; 257];
    let mut carry = 0i32;
    let mut bit = 0;
    while bit < 256 {
        if scalar.bits_var(bit, 1) as i32 == carry {
            bit += 1;
            continue;
        }
        let now = window.min(256 - bit);
        let mut word = scalar.bits_var(bit, now) as i32 + carry;
        carry = (word >> (window - 1)) & 1;
        word -= carry << window;
        digits[bit] = word;
        bit += now;
    }
    digits[256] = carry;
    digits
}

#[cfg(test)]
mod test {
    use super::*;

    fn scalar(hex: &str) -> Scalar {
        Scalar::from_bytes_overflow(&crate::hex::decode_array(hex).unwrap()).0
    }

    fn naive_mul(k: u32, point: &GroupElementJacobian) -> GroupElementJacobian {
        (0..k).fold(GroupElementJacobian::INFINITY, |acc, _| acc.add_var(point))
    }

    #[test]
    fn wnaf_recomposes() {
        for hex in [
            "0000000000000000000000000000000000000000000000000000000000000001",
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
            "8000000000000000000000000000000000000000000000000000000000000000",
            "7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0",
        ] {
            let s = scalar(hex);
            for window in [WINDOW_A, WINDOW_G] {
                let digits = wnaf(&s, window);
                let mut acc = Scalar::ZERO;
                let two = Scalar::from_u64(2);
                for digit in digits.iter().rev() {
                    acc = acc.mul(&two);
                    let term = Scalar::from_u64(digit.unsigned_abs() as u64);
                    acc = if *digit < 0 { acc.sub(&term) } else { acc.add(&term) };
                    assert!(*digit == 0 || (digit % 2 != 0 && digit.abs() < 1 << (window - 1)));
                }
                assert_eq!(acc, s);
            }
        }
    }

    #[test]
    fn generator_context_matches_naive() {
        let g = GroupElement::GENERATOR.to_jacobian();
        let ctx = ECMultGenContext::get();
        for k in [1u64, 2, 15, 16, 17, 255, 256, 1000] {
            let expected = naive_mul(k as u32, &g);
            assert!(ctx.mul(&Scalar::from_u64(k)).eq_var(&expected), "{}", k);
        }
        assert!(ctx.mul(&Scalar::ZERO).is_infinity_var());
        assert!(ctx.mul(&Scalar::MINUS_ONE).eq_var(&g.negate()));
    }

    #[test]
    fn all_multiplication_methods_agree() {
        let g = GroupElement::GENERATOR.to_jacobian();
        let a = scalar("c90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74020bbea63b14e5c9");
        let b = scalar("b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfef");
        let point = mul_const_time(&b, &g);
        assert!(point.eq_var(&ECMultGenContext::get().mul(&b)));

        let ctx = ECMultContext::get();
        let expected = ECMultGenContext::get().mul(&a.add(&b.mul(&b)));
        assert!(ctx.double_mul(&a, &b, &point).eq_var(&expected));
        assert!(
            ctx.multi_mul(None, [(&a, &g), (&b, &point)])
                .eq_var(&expected)
        );
        assert!(ctx.multi_mul(Some(&a), [(&Scalar::ZERO, &point)]).eq_var(&mul_const_time(&a, &g)));
    }

    #[test]
    fn cancelling_terms_give_infinity() {
        let g = GroupElement::GENERATOR.to_jacobian();
        let k = scalar("00000000000000000000000000000000000000000000000000000000deadbeef");
        let ctx = ECMultContext::get();
        assert!(ctx.double_mul(&k, &k.negate(), &g).is_infinity_var());
        assert!(ctx.multi_mul(None, core::iter::empty()).is_infinity_var());
        assert!(mul_const_time(&Scalar::ZERO, &g).is_infinity_var());
        assert!(mul_const_time(&k, &GroupElementJacobian::INFINITY).is_infinity_var());
    }
}
