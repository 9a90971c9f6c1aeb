//! Cast expressions.

use crate::error::AnalysisError;
use crate::types::PrimitiveType;

use super::analyzer::Resolution;
use super::expr::{Expr, ExprKind};

impl Expr {
    /// Creates an explicit `CAST(operand AS target)`.
    #[must_use]
    pub fn cast(operand: Expr, target: PrimitiveType) -> Self {
        Expr::new(
            ExprKind::Cast {
                target,
                implicit: false,
            },
            vec![operand],
        )
    }

    /// Creates an analyzed implicit cast around an analyzed operand.
    pub(crate) fn implicit_cast(operand: Expr, target: PrimitiveType) -> Self {
        assert!(
            operand.is_analyzed(),
            "implicit cast around unanalyzed expression: {}",
            operand.to_sql()
        );
        let mut cast = Expr::new(
            ExprKind::Cast {
                target,
                implicit: true,
            },
            vec![operand],
        );
        cast.set_type(target);
        cast
    }
}

/// Checks an explicit cast; the result type is the cast target.
pub(super) fn resolve(target: PrimitiveType, expr: &Expr) -> Result<Resolution, AnalysisError> {
    let operand = expr.child(0);
    let from = operand.ty();
    if !from.is_castable_to(target) {
        return Err(AnalysisError::InvalidCast {
            from,
            to: target,
            sql: operand.to_sql(),
        });
    }
    Ok(Resolution::keep_operands(target, expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_cast_sql() {
        let expr = Expr::cast(Expr::slot_ref("s"), PrimitiveType::BigInt);
        assert_eq!(expr.to_sql(), "CAST(s AS BIGINT)");
        assert!(!expr.is_implicit_cast());
    }

    #[test]
    fn test_implicit_cast_is_analyzed_and_transparent() {
        let operand = Expr::typed_slot_ref("i", PrimitiveType::Int);
        let cast = Expr::implicit_cast(operand, PrimitiveType::Double);
        assert!(cast.is_analyzed());
        assert_eq!(cast.ty(), PrimitiveType::Double);
        assert_eq!(cast.to_sql(), "i");
    }

    #[test]
    fn test_resolve_rejects_unconvertible_types() {
        let expr = Expr::cast(
            Expr::typed_slot_ref("d", PrimitiveType::Date),
            PrimitiveType::Int,
        );
        let err = resolve(PrimitiveType::Int, &expr).unwrap_err();
        assert_eq!(err.to_string(), "Invalid type cast of d from DATE to INT");
    }
}
