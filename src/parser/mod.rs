//! SQL expression parser.
//!
//! Turns expression text into the unanalyzed [`Expr`](crate::analysis::Expr)
//! tree consumed by the analyzer.

mod grammar;

pub use grammar::{parse_expr, MAX_NESTING_DEPTH};
