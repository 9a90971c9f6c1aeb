//! Contract tests for the type promotion lattice.
//!
//! These tests verify:
//! - The compatible type is total and symmetric over all type pairs
//! - Fixed-point pairs resolve to the wider operand
//! - Numeric pairs never lose resolution

use proptest::prelude::*;
use sqlsema::{assignment_compatible_type, PrimitiveType};

fn any_type() -> impl Strategy<Value = PrimitiveType> {
    prop_oneof![
        Just(PrimitiveType::Invalid),
        proptest::sample::select(PrimitiveType::VALID.to_vec()),
    ]
}

fn numeric_type() -> impl Strategy<Value = PrimitiveType> {
    proptest::sample::select(PrimitiveType::NUMERIC.to_vec())
}

fn fixed_point_type() -> impl Strategy<Value = PrimitiveType> {
    proptest::sample::select(vec![
        PrimitiveType::TinyInt,
        PrimitiveType::SmallInt,
        PrimitiveType::Int,
        PrimitiveType::BigInt,
    ])
}

proptest! {
    #[test]
    fn test_compatible_type_is_symmetric(t1 in any_type(), t2 in any_type()) {
        prop_assert_eq!(
            assignment_compatible_type(t1, t2),
            assignment_compatible_type(t2, t1)
        );
    }

    #[test]
    fn test_invalid_absorbs(t in any_type()) {
        prop_assert_eq!(
            assignment_compatible_type(PrimitiveType::Invalid, t),
            PrimitiveType::Invalid
        );
    }

    #[test]
    fn test_fixed_point_pairs_take_wider(t1 in fixed_point_type(), t2 in fixed_point_type()) {
        let compatible = assignment_compatible_type(t1, t2);
        prop_assert!(compatible.is_fixed_point());
        prop_assert_eq!(compatible.byte_size(), t1.byte_size().max(t2.byte_size()));
    }

    #[test]
    fn test_numeric_pairs_keep_resolution(t1 in numeric_type(), t2 in numeric_type()) {
        let compatible = assignment_compatible_type(t1, t2);
        prop_assert!(compatible.is_numeric());
        prop_assert!(compatible.byte_size() >= t1.byte_size());
        prop_assert!(compatible.byte_size() >= t2.byte_size());
        prop_assert!(t1.is_castable_to(compatible));
        prop_assert!(t2.is_castable_to(compatible));
    }

    #[test]
    fn test_max_resolution_is_category_maximum(t in any_type()) {
        let max = t.max_resolution_type();
        if t.is_fixed_point() {
            prop_assert_eq!(max, PrimitiveType::BigInt);
        } else if t.is_floating_point() {
            prop_assert_eq!(max, PrimitiveType::Double);
        } else {
            prop_assert_eq!(max, PrimitiveType::Invalid);
        }
    }
}

#[test]
fn test_compatible_type_is_reflexive() {
    for ty in PrimitiveType::VALID {
        assert_eq!(assignment_compatible_type(ty, ty), ty);
    }
}

#[test]
fn test_documented_promotions() {
    use PrimitiveType::*;

    let cases = [
        (TinyInt, Int, Int),
        (SmallInt, Float, Float),
        (Int, Float, Double),
        (BigInt, Double, Double),
        (Boolean, SmallInt, SmallInt),
        (String, Int, Double),
        (String, Date, Date),
        (Date, DateTime, DateTime),
        (DateTime, Timestamp, Timestamp),
        (Boolean, String, Invalid),
        (Date, Int, Invalid),
    ];
    for (t1, t2, expected) in cases {
        assert_eq!(
            assignment_compatible_type(t1, t2),
            expected,
            "compatible({t1}, {t2})"
        );
    }
}
