//! sqlsema - semantic analysis of SQL scalar expressions.
//!
//! Parsed expressions are type-checked against a column scope: every node
//! receives a resolved [`PrimitiveType`], operands are promoted to a common
//! type through implicit casts, and the analyzed tree can be rendered back to
//! SQL or flattened into a checksummed wire message for execution.

pub mod analysis;
pub mod error;
pub mod parser;
pub mod types;
pub mod wire;

pub use analysis::{
    Analyzer, AnalyzerConfig, ArithmeticOp, CaseWhenClause, ComparisonOp, Expr, ExprKind,
    LogicalOp, Scope, SlotDescriptor, DEFAULT_MAX_EXPR_DEPTH,
};
pub use error::{AnalysisError, Result, SemaError};
pub use parser::{parse_expr, MAX_NESTING_DEPTH};
pub use types::{assignment_compatible_type, PrimitiveType, TypeCategory, Value};
pub use wire::{WireExpr, WireExprNode};

/// Parses `sql` and analyzes it against `scope` with the default configuration.
///
/// # Errors
///
/// Returns a parse error for malformed text or the first analysis error.
///
/// # Example
///
/// ```
/// use sqlsema::{compile_expr, PrimitiveType, Scope};
///
/// let scope = Scope::new()
///     .with_column("tinyint_col", PrimitiveType::TinyInt)
///     .with_column("int_col", PrimitiveType::Int);
/// let expr = compile_expr("tinyint_col + int_col", &scope).unwrap();
/// assert_eq!(expr.ty(), PrimitiveType::BigInt);
/// ```
pub fn compile_expr(sql: &str, scope: &Scope) -> Result<Expr> {
    let mut expr = parse_expr(sql)?;
    Analyzer::new(scope).analyze(&mut expr)?;
    Ok(expr)
}
