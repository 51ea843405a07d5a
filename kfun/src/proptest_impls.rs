//! Implementations of [`Arbitrary`] for core types.
//!
//! [`Arbitrary`]: proptest::arbitrary::Arbitrary

use crate::{ECPrivKey, Point, Scalar, XOnly, marker::*, op};
use ::proptest::prelude::*;

impl Arbitrary for Scalar<NonZero> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            // insert some pathological cases
            1 => Just(Scalar::one()),
            1 => Just(Scalar::minus_one()),
            18 => any::<[u8;32]>().prop_filter_map("zero bytes not acceptable", |bytes| Scalar::from_bytes_mod_order(bytes).non_zero()),
        ].boxed()
    }
}

impl Arbitrary for Scalar<Zero> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            1 => Just(Scalar::zero()),
            1 => Just(Scalar::one().mark_zero()),
            1 => Just(Scalar::minus_one().mark_zero()),
            27 => any::<[u8;32]>().prop_map(Scalar::from_bytes_mod_order),
        ].boxed()
    }
}

impl Arbitrary for Point<NonZero> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        any::<Scalar>().prop_map(|scalar| op::mul_base(&scalar)).boxed()
    }
}

impl Arbitrary for Point<Zero> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            1 => Just(Point::zero()),
            9 => any::<Point>().prop_map(|p| p.mark_zero()),
        ]
        .boxed()
    }
}

impl Arbitrary for XOnly {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        any::<Point>().prop_map(|point| point.to_xonly()).boxed()
    }
}

impl Arbitrary for ECPrivKey {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        any::<Scalar>().prop_map(ECPrivKey::new).boxed()
    }
}
