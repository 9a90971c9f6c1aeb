//! Contract tests for literal construction.
//!
//! These tests verify:
//! - Every valid type either yields a literal of that type or is rejected
//! - Sign swapping negates numeric literals and widens when needed

use proptest::prelude::*;
use sqlsema::analysis::literal;
use sqlsema::{AnalysisError, PrimitiveType, SemaError, Value};

#[test]
fn test_literal_dispatch_covers_every_type() {
    let samples = [
        (PrimitiveType::Boolean, "true", Some(Value::Bool(true))),
        (PrimitiveType::TinyInt, "-7", Some(Value::Int(-7))),
        (PrimitiveType::SmallInt, "1000", Some(Value::Int(1000))),
        (PrimitiveType::Int, "100000", Some(Value::Int(100_000))),
        (PrimitiveType::BigInt, "10000000000", Some(Value::Int(10_000_000_000))),
        (PrimitiveType::Float, "0.5", Some(Value::Float(0.5))),
        (PrimitiveType::Double, "2.25", Some(Value::Float(2.25))),
        (PrimitiveType::String, "abc", Some(Value::String("abc".into()))),
        (PrimitiveType::Date, "2024-01-01", None),
        (PrimitiveType::DateTime, "2024-01-01 00:00:00", None),
        (PrimitiveType::Timestamp, "2024-01-01 00:00:00", None),
    ];
    assert_eq!(samples.len(), PrimitiveType::VALID.len());

    for (ty, raw, expected) in samples {
        match expected {
            Some(value) => {
                let expr = literal::create(raw, ty).unwrap();
                assert_eq!(expr.ty(), ty);
                assert_eq!(expr.literal_value(), Some(&value));
            }
            None => {
                let err = literal::create(raw, ty).unwrap_err();
                assert!(
                    err.to_string().contains("literals not supported"),
                    "{ty}: {err}"
                );
            }
        }
    }
}

#[test]
fn test_literal_rejects_invalid_target() {
    assert!(matches!(
        literal::create("1", PrimitiveType::Invalid),
        Err(SemaError::AnalysisError(AnalysisError::UnsupportedLiteralType { .. }))
    ));
}

#[test]
fn test_swap_sign_rejects_non_numeric() {
    for (raw, ty) in [("true", PrimitiveType::Boolean), ("x", PrimitiveType::String)] {
        let mut expr = literal::create(raw, ty).unwrap();
        let err = expr.swap_sign().unwrap_err();
        assert!(err.to_string().contains("only implemented for numeric literals"));
    }
}

proptest! {
    #[test]
    fn test_swap_sign_negates_integers(value in (i64::MIN + 1)..=i64::MAX) {
        let ty = PrimitiveType::smallest_fixed_point_for(value);
        let mut expr = literal::create(&value.to_string(), ty).unwrap();
        expr.swap_sign().unwrap();
        prop_assert_eq!(expr.literal_value(), Some(&Value::Int(-value)));
        let (min, max) = expr.ty().fixed_point_range().unwrap();
        prop_assert!(min <= -value && -value <= max);
        prop_assert!(expr.ty().byte_size() >= ty.byte_size());
    }

    #[test]
    fn test_swap_sign_twice_is_identity(value in -1.0e300f64..1.0e300) {
        let mut expr = literal::create(&value.to_string(), PrimitiveType::Double).unwrap();
        let original = expr.clone();
        expr.swap_sign().unwrap();
        expr.swap_sign().unwrap();
        prop_assert_eq!(expr, original);
    }

    #[test]
    fn test_fixed_point_range_enforced(value: i64) {
        for ty in [PrimitiveType::TinyInt, PrimitiveType::SmallInt, PrimitiveType::Int, PrimitiveType::BigInt] {
            let (min, max) = ty.fixed_point_range().unwrap();
            let result = literal::create(&value.to_string(), ty);
            prop_assert_eq!(result.is_ok(), (min..=max).contains(&value));
        }
    }
}
