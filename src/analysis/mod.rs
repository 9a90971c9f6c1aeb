//! Expression trees and semantic analysis.
//!
//! Expressions are built unresolved (by the parser or the constructors on
//! [`Expr`]) and then handed to an [`Analyzer`], which resolves every node's
//! type against a [`Scope`] and splices implicit casts into the tree wherever
//! an operand must be converted.

mod analyzer;
mod arithmetic;
mod case;
mod cast;
mod expr;
pub mod literal;
mod predicate;
mod scope;

pub use analyzer::{Analyzer, AnalyzerConfig, DEFAULT_MAX_EXPR_DEPTH};
pub use arithmetic::ArithmeticOp;
pub use case::CaseWhenClause;
pub use expr::{Expr, ExprKind};
pub use predicate::{ComparisonOp, LogicalOp};
pub use scope::{Scope, SlotDescriptor};
