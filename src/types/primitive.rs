//! Primitive type lattice.
//!
//! Every analyzed expression resolves to one of these scalar types. The
//! lattice answers three questions for the analyzer:
//! - which category a type belongs to (fixed-point, floating-point, ...)
//! - the smallest type two operand types widen to ([`assignment_compatible_type`])
//! - the widest type of a numeric category ([`PrimitiveType::max_resolution_type`])
//!
//! All functions here are pure and safe to call from any thread.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar types of the relational data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// Sentinel for an unresolved or unusable type.
    #[default]
    Invalid,
    /// Boolean.
    Boolean,
    /// 8-bit signed integer.
    TinyInt,
    /// 16-bit signed integer.
    SmallInt,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Date and time of day with nanosecond precision.
    Timestamp,
    /// UTF-8 string.
    String,
    /// Calendar date.
    Date,
    /// Date and time of day.
    DateTime,
}

/// Classification of valid types used by operator rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Boolean,
    FixedPoint,
    FloatingPoint,
    Textual,
    Temporal,
}

impl PrimitiveType {
    /// Every type except the [`PrimitiveType::Invalid`] sentinel.
    pub const VALID: [PrimitiveType; 11] = [
        PrimitiveType::Boolean,
        PrimitiveType::TinyInt,
        PrimitiveType::SmallInt,
        PrimitiveType::Int,
        PrimitiveType::BigInt,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Timestamp,
        PrimitiveType::String,
        PrimitiveType::Date,
        PrimitiveType::DateTime,
    ];

    /// Fixed-point and floating-point types, narrowest first.
    pub const NUMERIC: [PrimitiveType; 6] = [
        PrimitiveType::TinyInt,
        PrimitiveType::SmallInt,
        PrimitiveType::Int,
        PrimitiveType::BigInt,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// Returns the name of the type as used in SQL syntax.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Invalid => "INVALID",
            PrimitiveType::Boolean => "BOOLEAN",
            PrimitiveType::TinyInt => "TINYINT",
            PrimitiveType::SmallInt => "SMALLINT",
            PrimitiveType::Int => "INT",
            PrimitiveType::BigInt => "BIGINT",
            PrimitiveType::Float => "FLOAT",
            PrimitiveType::Double => "DOUBLE",
            PrimitiveType::Timestamp => "TIMESTAMP",
            PrimitiveType::String => "STRING",
            PrimitiveType::Date => "DATE",
            PrimitiveType::DateTime => "DATETIME",
        }
    }

    /// Parses a SQL type name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => Some(PrimitiveType::Boolean),
            "TINYINT" => Some(PrimitiveType::TinyInt),
            "SMALLINT" => Some(PrimitiveType::SmallInt),
            "INT" | "INTEGER" => Some(PrimitiveType::Int),
            "BIGINT" => Some(PrimitiveType::BigInt),
            "FLOAT" => Some(PrimitiveType::Float),
            "DOUBLE" => Some(PrimitiveType::Double),
            "TIMESTAMP" => Some(PrimitiveType::Timestamp),
            "STRING" => Some(PrimitiveType::String),
            "DATE" => Some(PrimitiveType::Date),
            "DATETIME" => Some(PrimitiveType::DateTime),
            _ => None,
        }
    }

    /// Returns true unless this is the invalid sentinel.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != PrimitiveType::Invalid
    }

    /// Returns the category of a valid type, or None for the sentinel.
    #[must_use]
    pub fn category(self) -> Option<TypeCategory> {
        match self {
            PrimitiveType::Invalid => None,
            PrimitiveType::Boolean => Some(TypeCategory::Boolean),
            PrimitiveType::TinyInt
            | PrimitiveType::SmallInt
            | PrimitiveType::Int
            | PrimitiveType::BigInt => Some(TypeCategory::FixedPoint),
            PrimitiveType::Float | PrimitiveType::Double => Some(TypeCategory::FloatingPoint),
            PrimitiveType::String => Some(TypeCategory::Textual),
            PrimitiveType::Timestamp | PrimitiveType::Date | PrimitiveType::DateTime => {
                Some(TypeCategory::Temporal)
            }
        }
    }

    #[must_use]
    pub fn is_boolean(self) -> bool {
        self == PrimitiveType::Boolean
    }

    #[must_use]
    pub fn is_fixed_point(self) -> bool {
        self.category() == Some(TypeCategory::FixedPoint)
    }

    #[must_use]
    pub fn is_floating_point(self) -> bool {
        self.category() == Some(TypeCategory::FloatingPoint)
    }

    /// Fixed-point or floating-point. Booleans are not numeric.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        self.is_fixed_point() || self.is_floating_point()
    }

    #[must_use]
    pub fn is_string(self) -> bool {
        self == PrimitiveType::String
    }

    #[must_use]
    pub fn is_temporal(self) -> bool {
        self.category() == Some(TypeCategory::Temporal)
    }

    /// Returns the storage size in bytes; None for variable-length and invalid types.
    #[must_use]
    pub fn byte_size(self) -> Option<usize> {
        match self {
            PrimitiveType::Boolean | PrimitiveType::TinyInt => Some(1),
            PrimitiveType::SmallInt => Some(2),
            PrimitiveType::Int | PrimitiveType::Float | PrimitiveType::Date => Some(4),
            PrimitiveType::BigInt | PrimitiveType::Double | PrimitiveType::DateTime => Some(8),
            PrimitiveType::Timestamp => Some(16),
            PrimitiveType::String | PrimitiveType::Invalid => None,
        }
    }

    /// Returns the widest type of this type's numeric category.
    ///
    /// Fixed-point types map to `BIGINT`, floating-point types to `DOUBLE`.
    /// Non-numeric types have no max-resolution type and yield `INVALID`.
    #[must_use]
    pub fn max_resolution_type(self) -> PrimitiveType {
        if self.is_fixed_point() {
            PrimitiveType::BigInt
        } else if self.is_floating_point() {
            PrimitiveType::Double
        } else {
            PrimitiveType::Invalid
        }
    }

    /// Returns the inclusive value range of a fixed-point type.
    #[must_use]
    pub fn fixed_point_range(self) -> Option<(i64, i64)> {
        match self {
            PrimitiveType::TinyInt => Some((i8::MIN.into(), i8::MAX.into())),
            PrimitiveType::SmallInt => Some((i16::MIN.into(), i16::MAX.into())),
            PrimitiveType::Int => Some((i32::MIN.into(), i32::MAX.into())),
            PrimitiveType::BigInt => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Returns the narrowest fixed-point type that can hold `value`.
    #[must_use]
    pub fn smallest_fixed_point_for(value: i64) -> PrimitiveType {
        [
            PrimitiveType::TinyInt,
            PrimitiveType::SmallInt,
            PrimitiveType::Int,
        ]
        .into_iter()
        .find(|ty| {
            ty.fixed_point_range()
                .is_some_and(|(min, max)| (min..=max).contains(&value))
        })
        .unwrap_or(PrimitiveType::BigInt)
    }

    /// Returns whether an explicit `CAST(... AS target)` from this type is legal.
    ///
    /// Booleans, numerics and strings convert freely among each other;
    /// `TIMESTAMP` converts to and from strings and numerics. `DATE` and
    /// `DATETIME` only cast to themselves.
    #[must_use]
    pub fn is_castable_to(self, target: PrimitiveType) -> bool {
        if !self.is_valid() || !target.is_valid() {
            return false;
        }
        if self == target {
            return true;
        }
        let scalar = |t: PrimitiveType| t.is_boolean() || t.is_numeric() || t.is_string();
        match (self, target) {
            (from, to) if scalar(from) && scalar(to) => true,
            (PrimitiveType::Timestamp, other) | (other, PrimitiveType::Timestamp) => {
                other.is_numeric() || other.is_string()
            }
            _ => false,
        }
    }

    /// Converts to an Arrow data type for the execution engine.
    ///
    /// Returns None for the invalid sentinel.
    #[must_use]
    pub fn to_arrow(self) -> Option<arrow::datatypes::DataType> {
        use arrow::datatypes::{DataType, TimeUnit};

        match self {
            PrimitiveType::Invalid => None,
            PrimitiveType::Boolean => Some(DataType::Boolean),
            PrimitiveType::TinyInt => Some(DataType::Int8),
            PrimitiveType::SmallInt => Some(DataType::Int16),
            PrimitiveType::Int => Some(DataType::Int32),
            PrimitiveType::BigInt => Some(DataType::Int64),
            PrimitiveType::Float => Some(DataType::Float32),
            PrimitiveType::Double => Some(DataType::Float64),
            PrimitiveType::Timestamp => Some(DataType::Timestamp(TimeUnit::Nanosecond, None)),
            PrimitiveType::String => Some(DataType::Utf8),
            PrimitiveType::Date => Some(DataType::Date32),
            PrimitiveType::DateTime => Some(DataType::Timestamp(TimeUnit::Microsecond, None)),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the smallest type both `t1` and `t2` widen to implicitly.
///
/// The relation is reflexive and commutative, and the result never has a
/// lower numeric resolution than either input. Pairs with no common type,
/// and any pair involving [`PrimitiveType::Invalid`], yield `INVALID`.
#[must_use]
pub fn assignment_compatible_type(t1: PrimitiveType, t2: PrimitiveType) -> PrimitiveType {
    use PrimitiveType::{
        BigInt, Boolean, Date, DateTime, Double, Float, Int, Invalid, SmallInt, String, Timestamp,
        TinyInt,
    };

    if !t1.is_valid() || !t2.is_valid() {
        return Invalid;
    }
    if t1 == t2 {
        return t1;
    }

    match (t1, t2) {
        (Boolean, t) | (t, Boolean) if t.is_numeric() => t,
        (a, b) if a.is_fixed_point() && b.is_fixed_point() => {
            if a.byte_size() >= b.byte_size() {
                a
            } else {
                b
            }
        }
        (Double, t) | (t, Double) if t.is_numeric() => Double,
        // FLOAT's 24-bit mantissa holds TINYINT and SMALLINT exactly, nothing wider
        (Float, TinyInt | SmallInt) | (TinyInt | SmallInt, Float) => Float,
        (Float, Int | BigInt) | (Int | BigInt, Float) => Double,
        (String, t) | (t, String) if t.is_numeric() => Double,
        (String, t) | (t, String) if t.is_temporal() => t,
        (Date, DateTime) | (DateTime, Date) => DateTime,
        (Timestamp, Date | DateTime) | (Date | DateTime, Timestamp) => Timestamp,
        _ => Invalid,
    }
}
