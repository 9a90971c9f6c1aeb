//! Contract tests for arithmetic analysis.
//!
//! These tests verify:
//! - `+ - *` widen to the max-resolution type
//! - `/` always produces DOUBLE
//! - `%` keeps the assignment-compatible type without widening
//! - Integer-only operators reject floating-point operands
//! - `~` is restricted to fixed-point operands
//! - Children are cast to the result type exactly once

use proptest::prelude::*;
use sqlsema::{
    assignment_compatible_type, AnalysisError, Analyzer, ArithmeticOp, Expr, PrimitiveType,
    SemaError,
};

use super::{column_for, typed_scope};

fn numeric_type() -> impl Strategy<Value = PrimitiveType> {
    proptest::sample::select(PrimitiveType::NUMERIC.to_vec())
}

fn binary_op() -> impl Strategy<Value = ArithmeticOp> {
    proptest::sample::select(
        ArithmeticOp::ALL
            .into_iter()
            .filter(|op| !op.is_unary())
            .collect::<Vec<_>>(),
    )
}

fn integer_only_op() -> impl Strategy<Value = ArithmeticOp> {
    proptest::sample::select(vec![
        ArithmeticOp::IntDivide,
        ArithmeticOp::BitAnd,
        ArithmeticOp::BitOr,
        ArithmeticOp::BitXor,
    ])
}

fn binary(op: ArithmeticOp, t1: PrimitiveType, t2: PrimitiveType) -> Expr {
    Expr::arithmetic(
        op,
        Expr::slot_ref(column_for(t1)),
        Some(Expr::slot_ref(column_for(t2))),
    )
}

fn accepts_floats(op: ArithmeticOp) -> bool {
    op != ArithmeticOp::IntDivide && !op.is_bitwise()
}

fn analyze(mut expr: Expr) -> sqlsema::Result<Expr> {
    let scope = typed_scope();
    Analyzer::new(&scope).analyze(&mut expr)?;
    Ok(expr)
}

proptest! {
    #[test]
    fn test_additive_ops_avoid_overflow(
        op in proptest::sample::select(vec![ArithmeticOp::Plus, ArithmeticOp::Minus, ArithmeticOp::Multiply]),
        t1 in numeric_type(),
        t2 in numeric_type(),
    ) {
        let expr = analyze(binary(op, t1, t2)).unwrap();
        let expected = if t1.is_fixed_point() && t2.is_fixed_point() {
            PrimitiveType::BigInt
        } else {
            PrimitiveType::Double
        };
        prop_assert_eq!(expr.ty(), expected);
    }

    #[test]
    fn test_division_is_double(t1 in numeric_type(), t2 in numeric_type()) {
        let expr = analyze(binary(ArithmeticOp::Divide, t1, t2)).unwrap();
        prop_assert_eq!(expr.ty(), PrimitiveType::Double);
    }

    #[test]
    fn test_mod_keeps_compatible_type(t1 in numeric_type(), t2 in numeric_type()) {
        let expr = analyze(binary(ArithmeticOp::Mod, t1, t2)).unwrap();
        prop_assert_eq!(expr.ty(), assignment_compatible_type(t1, t2));
        prop_assert_eq!(expr.child(0).is_implicit_cast(), t1 != expr.ty());
        prop_assert_eq!(expr.child(1).is_implicit_cast(), t2 != expr.ty());
    }

    #[test]
    fn test_integer_only_ops_reject_floats(op in integer_only_op(), t1 in numeric_type(), t2 in numeric_type()) {
        let result = analyze(binary(op, t1, t2));
        if t1.is_floating_point() || t2.is_floating_point() {
            let is_float_error = matches!(
                result,
                Err(SemaError::AnalysisError(AnalysisError::FloatingPointOperand { .. }))
            );
            prop_assert!(is_float_error);
        } else {
            let expr = result.unwrap();
            prop_assert!(expr.ty().is_fixed_point());
            prop_assert_eq!(expr.ty().byte_size(), t1.byte_size().max(t2.byte_size()));
        }
    }

    #[test]
    fn test_children_cast_to_result(op in binary_op(), t1 in numeric_type(), t2 in numeric_type()) {
        prop_assume!(accepts_floats(op) || !(t1.is_floating_point() || t2.is_floating_point()));
        let expr = analyze(binary(op, t1, t2)).unwrap();
        for (child, original) in expr.children().iter().zip([t1, t2]) {
            prop_assert_eq!(child.ty(), expr.ty());
            prop_assert_eq!(child.is_implicit_cast(), original != expr.ty());
            if child.is_implicit_cast() {
                prop_assert_eq!(child.child(0).ty(), original);
                prop_assert!(!child.child(0).is_implicit_cast());
            }
        }
    }

    #[test]
    fn test_reanalysis_is_noop(op in binary_op(), t1 in numeric_type(), t2 in numeric_type()) {
        prop_assume!(accepts_floats(op) || !(t1.is_floating_point() || t2.is_floating_point()));
        let scope = typed_scope();
        let analyzer = Analyzer::new(&scope);
        let mut expr = binary(op, t1, t2);
        analyzer.analyze(&mut expr).unwrap();
        let first = expr.clone();
        let nodes = expr.node_count();
        analyzer.analyze(&mut expr).unwrap();
        prop_assert_eq!(expr.node_count(), nodes);
        prop_assert_eq!(&expr, &first);
        prop_assert_eq!(expr.ty(), first.ty());
    }
}

#[test]
fn test_bitnot_on_fixed_point_keeps_type() {
    for ty in [
        PrimitiveType::TinyInt,
        PrimitiveType::SmallInt,
        PrimitiveType::Int,
        PrimitiveType::BigInt,
    ] {
        let expr = analyze(Expr::arithmetic(
            ArithmeticOp::BitNot,
            Expr::slot_ref(column_for(ty)),
            None,
        ))
        .unwrap();
        assert_eq!(expr.ty(), ty);
        assert!(!expr.child(0).is_implicit_cast());
    }
}

#[test]
fn test_bitnot_rejects_other_types() {
    for ty in [PrimitiveType::Float, PrimitiveType::Double, PrimitiveType::String] {
        let err = analyze(Expr::arithmetic(
            ArithmeticOp::BitNot,
            Expr::slot_ref(column_for(ty)),
            None,
        ))
        .unwrap_err();
        assert!(
            matches!(
                err,
                SemaError::AnalysisError(AnalysisError::BitwiseOnNonFixedPoint { .. })
            ),
            "~ on {ty}: {err}"
        );
    }

    for ty in [PrimitiveType::Boolean, PrimitiveType::Date] {
        let err = analyze(Expr::arithmetic(
            ArithmeticOp::BitNot,
            Expr::slot_ref(column_for(ty)),
            None,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            SemaError::AnalysisError(AnalysisError::NonArithmeticOperand { .. })
        ));
    }
}

#[test]
fn test_non_arithmetic_operands_rejected() {
    for ty in [
        PrimitiveType::Boolean,
        PrimitiveType::Date,
        PrimitiveType::DateTime,
        PrimitiveType::Timestamp,
    ] {
        let err = analyze(binary(ArithmeticOp::Plus, PrimitiveType::Int, ty)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("requires numeric or string operands"), "{msg}");
        assert!(msg.contains(&column_for(ty)), "{msg}");
    }
}

#[test]
fn test_string_operand_promotes_to_double() {
    let expr = analyze(binary(ArithmeticOp::Minus, PrimitiveType::String, PrimitiveType::Int)).unwrap();
    assert_eq!(expr.ty(), PrimitiveType::Double);

    let expr = analyze(binary(ArithmeticOp::Mod, PrimitiveType::TinyInt, PrimitiveType::String)).unwrap();
    assert_eq!(expr.ty(), PrimitiveType::Double);

    let err = analyze(binary(ArithmeticOp::BitOr, PrimitiveType::String, PrimitiveType::Int)).unwrap_err();
    assert!(matches!(
        err,
        SemaError::AnalysisError(AnalysisError::NonIntegerOperand { .. })
    ));
}

#[test]
fn test_tinyint_plus_int_end_to_end() {
    let expr = analyze(binary(ArithmeticOp::Plus, PrimitiveType::TinyInt, PrimitiveType::Int)).unwrap();

    assert_eq!(expr.ty(), PrimitiveType::BigInt);
    assert_eq!(expr.to_sql(), "tinyint_col + int_col");
    assert!(expr.child(0).is_implicit_cast());
    assert!(expr.child(1).is_implicit_cast());
    assert_eq!(expr.child(0).child(0).ty(), PrimitiveType::TinyInt);
    assert_eq!(expr.child(1).child(0).ty(), PrimitiveType::Int);
}
