//! Points on y^2 = x^3 + 7 in affine and Jacobian coordinates.
//!
//! Operations without a `_var` suffix run in constant time with respect to the coordinates of their
//! inputs, including whether an input is the point at infinity. The `_var` versions branch and must
//! only see public data.
use super::field::{FieldElement, batch_invert};
use alloc::vec::Vec;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// An affine point or the point at infinity.
///
/// When `infinity` is set the coordinates carry no meaning.
#[derive(Clone, Copy, Debug)]
pub struct GroupElement {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) infinity: bool,
}

/// A point in Jacobian coordinates `(X, Y, Z)` standing for the affine point `(X/Z^2, Y/Z^3)`.
///
/// `Z = 0` is the point at infinity.
#[derive(Clone, Copy, Debug)]
pub struct GroupElementJacobian {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
}

impl GroupElement {
    /// The point at infinity.
    pub const INFINITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: true,
    };

    /// The standard generator.
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_limbs([
            0x59F2_815B_16F8_1798,
            0x029B_FCDB_2DCE_28D9,
            0x55A0_6295_CE87_0B07,
            0x79BE_667E_F9DC_BBAC,
        ]),
        y: FieldElement::from_limbs([
            0x9C47_D08F_FB10_D4B8,
            0xFD17_B448_A685_5419,
            0x5DA4_FBFC_0E11_08A8,
            0x483A_DA77_26A3_C465,
        ]),
        infinity: false,
    };

    /// Creates a point from coordinates, returning `None` if they are not on the curve.
    pub fn from_xy(x: FieldElement, y: FieldElement) -> Option<Self> {
        let point = Self {
            x: x.normalize(),
            y: y.normalize(),
            infinity: false,
        };
        if point.is_on_curve() { Some(point) } else { None }
    }

    /// Finds the point with x-coordinate `x` whose y-coordinate has parity `y_odd`.
    ///
    /// Fails if `x^3 + 7` has no square root. Runs in constant time.
    pub fn from_x_parity(x: &FieldElement, y_odd: Choice) -> CtOption<Self> {
        let x = x.normalize();
        let y2 = x.square() * x + FieldElement::CURVE_B;
        y2.sqrt().map(|y| {
            let y = y.normalize();
            let flip = y.is_odd() ^ y_odd;
            Self {
                x,
                y: FieldElement::conditional_select(&y, &-y, flip).normalize(),
                infinity: false,
            }
        })
    }

    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    /// Checks that `y^2 = x^3 + 7`. The point at infinity is considered valid.
    pub fn is_on_curve(&self) -> bool {
        if self.infinity {
            return true;
        }
        self.y.square() == self.x.square() * self.x + FieldElement::CURVE_B
    }

    /// The normalized x-coordinate. Meaningless for the point at infinity.
    pub fn x(&self) -> FieldElement {
        self.x.normalize()
    }

    /// The normalized y-coordinate. Meaningless for the point at infinity.
    pub fn y(&self) -> FieldElement {
        self.y.normalize()
    }

    pub fn negate(&self) -> Self {
        Self {
            x: self.x,
            y: (-self.y).normalize(),
            infinity: self.infinity,
        }
    }

    pub fn conditional_negate(&mut self, choice: Choice) {
        let negated = self.y.negate().normalize();
        self.y.conditional_assign(&negated, choice);
    }

    pub fn to_jacobian(&self) -> GroupElementJacobian {
        GroupElementJacobian::from_affine(self)
    }

    fn infinity_choice(&self) -> Choice {
        Choice::from(self.infinity as u8)
    }
}

impl ConditionallySelectable for GroupElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&(a.infinity as u8), &(b.infinity as u8), choice) == 1,
        }
    }
}

impl ConstantTimeEq for GroupElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        let both_infinity = self.infinity_choice() & other.infinity_choice();
        let both_finite = !self.infinity_choice() & !other.infinity_choice();
        both_infinity | (both_finite & self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y))
    }
}

impl PartialEq for GroupElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for GroupElement {}

impl Default for GroupElement {
    fn default() -> Self {
        Self::INFINITY
    }
}

impl GroupElementJacobian {
    /// The point at infinity.
    pub const INFINITY: Self = Self {
        x: FieldElement::ONE,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    pub fn from_affine(point: &GroupElement) -> Self {
        let finite = Self {
            x: point.x,
            y: point.y,
            z: FieldElement::ONE,
        };
        Self::conditional_select(&finite, &Self::INFINITY, point.infinity_choice())
    }

    /// Converts back to affine coordinates with one field inversion.
    pub fn to_affine(&self) -> GroupElement {
        let is_infinity = self.is_infinity();
        let z_inv = self.z.invert().unwrap_or(FieldElement::ONE);
        let z_inv2 = z_inv.square();
        let finite = GroupElement {
            x: (self.x * z_inv2).normalize(),
            y: (self.y * z_inv2 * z_inv).normalize(),
            infinity: false,
        };
        GroupElement::conditional_select(&finite, &GroupElement::INFINITY, is_infinity)
    }

    /// Converts many points to affine coordinates with a single field inversion.
    pub fn to_affine_batch(points: &[Self]) -> Vec<GroupElement> {
        let mut zs: Vec<FieldElement> = points
            .iter()
            .map(|point| FieldElement::conditional_select(&point.z, &FieldElement::ONE, point.is_infinity()))
            .collect();
        batch_invert(&mut zs);
        points
            .iter()
            .zip(zs)
            .map(|(point, z_inv)| {
                if bool::from(point.is_infinity()) {
                    return GroupElement::INFINITY;
                }
                let z_inv2 = z_inv.square();
                GroupElement {
                    x: (point.x * z_inv2).normalize(),
                    y: (point.y * z_inv2 * z_inv).normalize(),
                    infinity: false,
                }
            })
            .collect()
    }

    pub fn is_infinity(&self) -> Choice {
        self.z.is_zero()
    }

    pub fn is_infinity_var(&self) -> bool {
        self.is_infinity().into()
    }

    pub fn negate(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
            z: self.z,
        }
    }

    pub fn conditional_negate(&mut self, choice: Choice) {
        let negated = -self.y;
        self.y.conditional_assign(&negated, choice);
    }

    /// Returns `2 * self`. Doubling the point at infinity gives the point at infinity.
    pub fn double(&self) -> Self {
        // dbl-2009-l: http://hyperelliptic.org/EFD/g1p/auto-shortw-jacobian-0.html#doubling-dbl-2009-l
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let d = ((self.x + b).square() - a - c).double();
        let e = a.mul_word(3);
        let f = e.square();
        let x3 = f - d.double();
        let y3 = e * (d - x3) - c.mul_word(8);
        let z3 = (self.y * self.z).double();
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// The generic addition formula plus the values needed to detect its exceptional cases.
    ///
    /// Returns the sum along with `H = U2 - U1` and `R = S2 - S1`. When `H = 0` the points share an
    /// x-coordinate: if `R = 0` too they are equal and the result is garbage, otherwise they are
    /// inverses and the result is correctly the point at infinity.
    fn add_unchecked(&self, other: &Self) -> (Self, FieldElement, FieldElement) {
        // add-2007-bl
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * z2z2;
        let u2 = other.x * z1z1;
        let s1 = self.y * other.z * z2z2;
        let s2 = other.y * self.z * z1z1;
        let h = u2 - u1;
        let r = s2 - s1;
        let h2 = h.square();
        let h3 = h * h2;
        let u1h2 = u1 * h2;
        let x3 = r.square() - h3 - u1h2.double();
        let y3 = r * (u1h2 - x3) - s1 * h3;
        let z3 = self.z * other.z * h;
        (
            Self {
                x: x3,
                y: y3,
                z: z3,
            },
            h,
            r,
        )
    }

    /// Like [`add_unchecked`](Self::add_unchecked) but with `other` in affine coordinates.
    fn add_affine_unchecked(&self, other: &GroupElement) -> (Self, FieldElement, FieldElement) {
        // madd-2007-bl with Z2 = 1
        let z1z1 = self.z.square();
        let u2 = other.x * z1z1;
        let s2 = other.y * self.z * z1z1;
        let h = u2 - self.x;
        let r = s2 - self.y;
        let h2 = h.square();
        let h3 = h * h2;
        let x1h2 = self.x * h2;
        let x3 = r.square() - h3 - x1h2.double();
        let y3 = r * (x1h2 - x3) - self.y * h3;
        let z3 = self.z * h;
        (
            Self {
                x: x3,
                y: y3,
                z: z3,
            },
            h,
            r,
        )
    }

    /// Adds two points in constant time. Handles every input including the point at infinity and
    /// equal points.
    pub fn add(&self, other: &Self) -> Self {
        let (sum, h, r) = self.add_unchecked(other);
        let doubled = self.double();
        let mut result = Self::conditional_select(&sum, &doubled, h.is_zero() & r.is_zero());
        result.conditional_assign(other, self.is_infinity());
        result.conditional_assign(self, other.is_infinity());
        result
    }

    /// Adds an affine point in constant time. Handles every input including the point at infinity and
    /// equal points.
    pub fn add_affine(&self, other: &GroupElement) -> Self {
        let (sum, h, r) = self.add_affine_unchecked(other);
        let doubled = self.double();
        let mut result = Self::conditional_select(&sum, &doubled, h.is_zero() & r.is_zero());
        result.conditional_assign(&Self::from_affine(other), self.is_infinity());
        result.conditional_assign(self, other.infinity_choice());
        result
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    pub fn add_var(&self, other: &Self) -> Self {
        if self.is_infinity_var() {
            return *other;
        }
        if other.is_infinity_var() {
            return *self;
        }
        let (sum, h, r) = self.add_unchecked(other);
        if bool::from(h.is_zero()) && bool::from(r.is_zero()) {
            return self.double();
        }
        sum
    }

    pub fn add_affine_var(&self, other: &GroupElement) -> Self {
        if other.infinity {
            return *self;
        }
        if self.is_infinity_var() {
            return Self::from_affine(other);
        }
        let (sum, h, r) = self.add_affine_unchecked(other);
        if bool::from(h.is_zero()) && bool::from(r.is_zero()) {
            return self.double();
        }
        sum
    }

    #[cfg(test)]
    pub fn eq_var(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl ConditionallySelectable for GroupElementJacobian {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for GroupElementJacobian {
    fn ct_eq(&self, other: &Self) -> Choice {
        // (X1/Z1^2, Y1/Z1^3) == (X2/Z2^2, Y2/Z2^3) cross multiplied
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let same_x = (self.x * z2z2).ct_eq(&(other.x * z1z1));
        let same_y = (self.y * z2z2 * other.z).ct_eq(&(other.y * z1z1 * self.z));
        let both_infinity = self.is_infinity() & other.is_infinity();
        let both_finite = !self.is_infinity() & !other.is_infinity();
        both_infinity | (both_finite & same_x & same_y)
    }
}

impl Default for GroupElementJacobian {
    fn default() -> Self {
        Self::INFINITY
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn g() -> GroupElementJacobian {
        GroupElement::GENERATOR.to_jacobian()
    }

    fn multiple(k: u32) -> GroupElementJacobian {
        (1..k).fold(g(), |acc, _| acc.add_var(&g()))
    }

    #[test]
    fn generator_is_on_curve() {
        assert!(GroupElement::GENERATOR.is_on_curve());
        assert!(GroupElement::from_xy(GroupElement::GENERATOR.x, FieldElement::ONE).is_none());
    }

    #[test]
    fn doubling_matches_addition() {
        let two_g = g().double();
        assert!(two_g.eq_var(&g().add(&g())));
        assert!(two_g.eq_var(&g().add_affine(&GroupElement::GENERATOR)));
        assert!(two_g.eq_var(&g().add_var(&g())));
        // known x-coordinate of 2G
        let x = FieldElement::from_bytes(
            &crate::hex::decode_array(
                "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(two_g.to_affine().x(), x);
    }

    #[test]
    fn infinity_cases() {
        let inf = GroupElementJacobian::INFINITY;
        assert!(inf.add(&g()).eq_var(&g()));
        assert!(g().add(&inf).eq_var(&g()));
        assert!(g().add(&g().negate()).is_infinity_var());
        assert!(g().add_affine(&GroupElement::GENERATOR.negate()).is_infinity_var());
        assert!(g().add_affine(&GroupElement::INFINITY).eq_var(&g()));
        assert!(inf.add_affine(&GroupElement::GENERATOR).eq_var(&g()));
        assert!(inf.double().is_infinity_var());
        assert!(inf.to_affine().is_infinity());
    }

    #[test]
    fn associativity() {
        let a = multiple(3);
        let b = multiple(5);
        let c = multiple(7);
        assert!(a.add(&b).add(&c).eq_var(&a.add(&b.add(&c))));
        assert!(multiple(15).eq_var(&a.add(&b).add(&c)));
        assert!(multiple(4).eq_var(&a.sub(&b.negate()).sub(&multiple(4))));
    }

    #[test]
    fn parity_selection() {
        let gx = GroupElement::GENERATOR.x;
        let even = GroupElement::from_x_parity(&gx, Choice::from(0)).unwrap();
        let odd = GroupElement::from_x_parity(&gx, Choice::from(1)).unwrap();
        assert_eq!(even, GroupElement::GENERATOR);
        assert_eq!(odd, GroupElement::GENERATOR.negate());
        // x = 5 gives x^3 + 7 = 132 which is not a square mod p
        let five = FieldElement::from_limbs([5, 0, 0, 0]);
        assert!(bool::from(GroupElement::from_x_parity(&five, Choice::from(0)).is_none()));
    }

    #[test]
    fn batch_normalization() {
        let points = [multiple(2), GroupElementJacobian::INFINITY, multiple(9)];
        let affine = GroupElementJacobian::to_affine_batch(&points);
        assert_eq!(affine[0], points[0].to_affine());
        assert!(affine[1].is_infinity());
        assert_eq!(affine[2], points[2].to_affine());
    }
}
