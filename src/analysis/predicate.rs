//! Comparison and logical predicates.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::{assignment_compatible_type, PrimitiveType};
use crate::wire::WireOperator;

use super::analyzer::Resolution;
use super::expr::Expr;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Equal (=).
    Eq,
    /// Not equal (<>).
    Ne,
    /// Less than (<).
    Lt,
    /// Less than or equal (<=).
    Le,
    /// Greater than (>).
    Gt,
    /// Greater than or equal (>=).
    Ge,
}

impl ComparisonOp {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }

    /// Parses a comparison operator from its symbol.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(ComparisonOp::Eq),
            "<>" | "!=" => Some(ComparisonOp::Ne),
            "<" => Some(ComparisonOp::Lt),
            "<=" => Some(ComparisonOp::Le),
            ">" => Some(ComparisonOp::Gt),
            ">=" => Some(ComparisonOp::Ge),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_wire(self) -> WireOperator {
        match self {
            ComparisonOp::Eq => WireOperator::Eq,
            ComparisonOp::Ne => WireOperator::Ne,
            ComparisonOp::Lt => WireOperator::Lt,
            ComparisonOp::Le => WireOperator::Le,
            ComparisonOp::Gt => WireOperator::Gt,
            ComparisonOp::Ge => WireOperator::Ge,
        }
    }
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Not => "NOT",
        }
    }

    #[must_use]
    pub fn to_wire(self) -> WireOperator {
        match self {
            LogicalOp::And => WireOperator::And,
            LogicalOp::Or => WireOperator::Or,
            LogicalOp::Not => WireOperator::Not,
        }
    }
}

/// Both sides of a comparison are cast to their common type.
pub(super) fn resolve_comparison(expr: &Expr) -> Result<Resolution, AnalysisError> {
    let t1 = expr.child(0).ty();
    let t2 = expr.child(1).ty();
    let compatible = assignment_compatible_type(t1, t2);
    if !compatible.is_valid() {
        return Err(AnalysisError::IncompatibleOperands {
            lhs: t1,
            rhs: t2,
            sql: expr.to_sql(),
        });
    }
    Ok(Resolution::new(PrimitiveType::Boolean, vec![compatible; 2]))
}

pub(super) fn resolve_compound(expr: &Expr) -> Result<Resolution, AnalysisError> {
    for operand in expr.children() {
        if !operand.ty().is_boolean() {
            return Err(AnalysisError::NonBooleanOperand {
                operand: operand.to_sql(),
                actual: operand.ty(),
                sql: expr.to_sql(),
            });
        }
    }
    Ok(Resolution::keep_operands(PrimitiveType::Boolean, expr))
}
