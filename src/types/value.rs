//! Literal value container.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value carried by a typed literal node.
///
/// The value does not record its width: an `Int` may belong to a `TINYINT`
/// or a `BIGINT` literal, the enclosing node's type decides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Fixed-point value of any width.
    Int(i64),
    /// Floating-point value of any width.
    Float(f64),
    /// String value.
    String(String),
}

impl Value {
    /// Returns true for integer and floating-point values.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Attempts to extract a bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an i64 value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Renders the value as a SQL literal.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(i) => i.to_string(),
            // Debug keeps the decimal point so the text reads back as a float
            Value::Float(f) => format!("{f:?}"),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql() {
        assert_eq!(Value::Bool(true).to_sql(), "TRUE");
        assert_eq!(Value::Int(-42).to_sql(), "-42");
        assert_eq!(Value::Float(1.5).to_sql(), "1.5");
        assert_eq!(Value::Float(2.0).to_sql(), "2.0");
        assert_eq!(Value::String("it's".into()).to_sql(), "'it''s'");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Int(7).as_float(), None);
        assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
        assert_eq!(Value::String("a".into()).as_string(), Some("a"));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert!(Value::Float(0.5).is_numeric());
        assert!(!Value::Bool(true).is_numeric());
    }

    #[test]
    fn test_float_equality_follows_ieee() {
        // -0.0 comes out of negating a zero literal
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(1.0), Value::Int(1));
    }
}
