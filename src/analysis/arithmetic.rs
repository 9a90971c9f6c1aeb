//! Arithmetic operators and their typing rules.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::{assignment_compatible_type, PrimitiveType};
use crate::wire::WireOperator;

use super::analyzer::Resolution;
use super::expr::Expr;

/// Arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    /// `*`
    Multiply,
    /// `/`, always produces `DOUBLE`.
    Divide,
    /// `%`
    Mod,
    /// `DIV`, integer division.
    IntDivide,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `~`, the only unary operator.
    BitNot,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 10] = [
        ArithmeticOp::Multiply,
        ArithmeticOp::Divide,
        ArithmeticOp::Mod,
        ArithmeticOp::IntDivide,
        ArithmeticOp::Plus,
        ArithmeticOp::Minus,
        ArithmeticOp::BitAnd,
        ArithmeticOp::BitOr,
        ArithmeticOp::BitXor,
        ArithmeticOp::BitNot,
    ];

    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Mod => "%",
            ArithmeticOp::IntDivide => "DIV",
            ArithmeticOp::Plus => "+",
            ArithmeticOp::Minus => "-",
            ArithmeticOp::BitAnd => "&",
            ArithmeticOp::BitOr => "|",
            ArithmeticOp::BitXor => "^",
            ArithmeticOp::BitNot => "~",
        }
    }

    /// Returns the operator tag used in the wire format.
    #[must_use]
    pub fn to_wire(self) -> WireOperator {
        match self {
            ArithmeticOp::Multiply => WireOperator::Multiply,
            ArithmeticOp::Divide => WireOperator::Divide,
            ArithmeticOp::Mod => WireOperator::Mod,
            ArithmeticOp::IntDivide => WireOperator::IntDivide,
            ArithmeticOp::Plus => WireOperator::Plus,
            ArithmeticOp::Minus => WireOperator::Minus,
            ArithmeticOp::BitAnd => WireOperator::BitAnd,
            ArithmeticOp::BitOr => WireOperator::BitOr,
            ArithmeticOp::BitXor => WireOperator::BitXor,
            ArithmeticOp::BitNot => WireOperator::BitNot,
        }
    }

    #[must_use]
    pub fn is_unary(self) -> bool {
        self == ArithmeticOp::BitNot
    }

    /// True for the binary bitwise operators `&`, `|` and `^`.
    #[must_use]
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            ArithmeticOp::BitAnd | ArithmeticOp::BitOr | ArithmeticOp::BitXor
        )
    }
}

impl std::fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-checks an arithmetic node whose children are analyzed.
///
/// `+`, `-` and `*` widen to the max-resolution type of the common operand
/// type so that the operation itself cannot overflow.
pub(super) fn resolve(op: ArithmeticOp, expr: &Expr) -> Result<Resolution, AnalysisError> {
    for operand in expr.children() {
        let ty = operand.ty();
        if !ty.is_numeric() && !ty.is_string() {
            return Err(AnalysisError::NonArithmeticOperand { sql: expr.to_sql() });
        }
    }

    if op.is_unary() {
        let operand_ty = expr.child(0).ty();
        if !operand_ty.is_fixed_point() {
            return Err(AnalysisError::BitwiseOnNonFixedPoint { sql: expr.to_sql() });
        }
        return Ok(Resolution::uniform(operand_ty, 1));
    }

    let t1 = expr.child(0).ty();
    let t2 = expr.child(1).ty();
    let compatible = assignment_compatible_type(t1, t2);

    let ty = match op {
        ArithmeticOp::Multiply | ArithmeticOp::Plus | ArithmeticOp::Minus => {
            require_numeric(compatible, t1, t2, expr)?;
            let ty = compatible.max_resolution_type();
            assert!(
                ty.is_valid(),
                "no max-resolution type for {compatible} in: {}",
                expr.to_sql()
            );
            ty
        }
        ArithmeticOp::Mod => {
            require_numeric(compatible, t1, t2, expr)?;
            compatible
        }
        ArithmeticOp::Divide => PrimitiveType::Double,
        ArithmeticOp::IntDivide
        | ArithmeticOp::BitAnd
        | ArithmeticOp::BitOr
        | ArithmeticOp::BitXor => {
            if t1.is_floating_point() || t2.is_floating_point() {
                return Err(AnalysisError::FloatingPointOperand {
                    op: op.as_str().to_string(),
                    sql: expr.to_sql(),
                });
            }
            // strings would unify to DOUBLE; they must be cast explicitly here
            if t1.is_string() || t2.is_string() {
                return Err(AnalysisError::NonIntegerOperand {
                    op: op.as_str().to_string(),
                    sql: expr.to_sql(),
                });
            }
            assert!(
                compatible.is_fixed_point(),
                "integer operator {op} resolved to {compatible} in: {}",
                expr.to_sql()
            );
            compatible
        }
        ArithmeticOp::BitNot => unreachable!("unary operator {op} in binary rule: {}", expr.to_sql()),
    };

    Ok(Resolution::uniform(ty, 2))
}

/// Two string operands unify to STRING, which has no arithmetic.
fn require_numeric(
    compatible: PrimitiveType,
    t1: PrimitiveType,
    t2: PrimitiveType,
    expr: &Expr,
) -> Result<(), AnalysisError> {
    if compatible.is_numeric() {
        Ok(())
    } else {
        Err(AnalysisError::IncompatibleOperands {
            lhs: t1,
            rhs: t2,
            sql: expr.to_sql(),
        })
    }
}
