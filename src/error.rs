//! Error types for sqlsema.
//!
//! Only user-facing failures live here. Broken analyzer invariants (an
//! arithmetic node with the wrong arity, a promotion that yields an invalid
//! type, serializing an unanalyzed tree) panic instead and are never turned
//! into one of these values.

use thiserror::Error;

use crate::types::PrimitiveType;

/// Result type alias using [`SemaError`].
pub type Result<T> = std::result::Result<T, SemaError>;

/// Top-level error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemaError {
    /// Parse error with location information.
    #[error("Parse error at line {line}, column {col}: {message}")]
    ParseError {
        line: usize,
        col: usize,
        message: String,
    },

    /// Semantic analysis rejected the expression.
    #[error("Analysis error: {0}")]
    AnalysisError(#[from] AnalysisError),

    /// Wire message could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Checksum validation failure.
    #[error("Checksum mismatch: {0}")]
    ChecksumError(String),
}

/// Errors raised while analyzing an expression tree.
///
/// Messages that concern a whole expression embed its canonical SQL text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Arithmetic operand is neither numeric nor a string.
    #[error("Arithmetic operation requires numeric or string operands: {sql}")]
    NonArithmeticOperand { sql: String },

    /// Operand of `~` is not a fixed-point type.
    #[error("Bitwise operations only allowed on fixed-point types: {sql}")]
    BitwiseOnNonFixedPoint { sql: String },

    /// Floating-point operand to an integer-only operator.
    #[error("Invalid floating point argument to operation {op}: {sql}")]
    FloatingPointOperand { op: String, sql: String },

    /// String operand to an integer-only operator.
    #[error("Invalid non-integer argument to operation {op}: {sql}")]
    NonIntegerOperand { op: String, sql: String },

    /// Operand types have no common type.
    #[error("Incompatible operand types {lhs} and {rhs}: {sql}")]
    IncompatibleOperands {
        lhs: PrimitiveType,
        rhs: PrimitiveType,
        sql: String,
    },

    /// Predicate operand does not return BOOLEAN.
    #[error("Operand '{operand}' of '{sql}' should return type BOOLEAN but returns type {actual}")]
    NonBooleanOperand {
        operand: String,
        actual: PrimitiveType,
        sql: String,
    },

    /// Explicit cast between types that do not convert.
    #[error("Invalid type cast of {sql} from {from} to {to}")]
    InvalidCast {
        from: PrimitiveType,
        to: PrimitiveType,
        sql: String,
    },

    /// Column reference not found in scope.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Literal requested for a type that has no literal syntax.
    #[error("{ty} literals not supported: {value}")]
    UnsupportedLiteralType { ty: PrimitiveType, value: String },

    /// Literal text does not parse as the target type.
    #[error("Invalid {ty} literal: {value}")]
    InvalidLiteral { ty: PrimitiveType, value: String },

    /// Literal value does not fit the target type.
    #[error("Literal {value} out of range for type {ty}")]
    LiteralOutOfRange { ty: PrimitiveType, value: String },

    /// Operation has no meaning for this kind of node.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Expression tree nests deeper than the configured limit.
    #[error("Exceeded the maximum depth of an expression tree ({max})")]
    ExprDepthExceeded { max: usize },
}
