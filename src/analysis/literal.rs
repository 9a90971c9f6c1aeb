//! Literal construction.
//!
//! Raw literal text coming from the parser becomes a typed leaf through
//! [`create`], which dispatches on the target type only.

use crate::error::{AnalysisError, Result};
use crate::types::{PrimitiveType, Value};

use super::expr::{Expr, ExprKind};

/// Converts raw literal text into a literal node of type `target`.
///
/// # Errors
///
/// Returns an analysis error if the text does not parse as `target`, the
/// value is out of the type's range, or `target` has no literal form
/// (temporal types and the invalid sentinel).
pub fn create(raw: &str, target: PrimitiveType) -> Result<Expr> {
    let value = match target {
        PrimitiveType::Boolean => Value::Bool(parse_bool(raw)?),
        PrimitiveType::TinyInt
        | PrimitiveType::SmallInt
        | PrimitiveType::Int
        | PrimitiveType::BigInt => Value::Int(parse_int(raw, target)?),
        PrimitiveType::Float | PrimitiveType::Double => Value::Float(parse_float(raw, target)?),
        PrimitiveType::String => Value::String(raw.to_string()),
        PrimitiveType::Date
        | PrimitiveType::DateTime
        | PrimitiveType::Timestamp
        | PrimitiveType::Invalid => {
            return Err(AnalysisError::UnsupportedLiteralType {
                ty: target,
                value: raw.to_string(),
            }
            .into());
        }
    };

    let mut expr = Expr::new(ExprKind::Literal(value), Vec::new());
    expr.set_type(target);
    Ok(expr)
}

fn parse_bool(raw: &str) -> std::result::Result<bool, AnalysisError> {
    let text = raw.trim();
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(AnalysisError::InvalidLiteral {
            ty: PrimitiveType::Boolean,
            value: raw.to_string(),
        })
    }
}

fn parse_int(raw: &str, target: PrimitiveType) -> std::result::Result<i64, AnalysisError> {
    let text = raw.trim();
    let digits = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AnalysisError::InvalidLiteral {
            ty: target,
            value: raw.to_string(),
        });
    }
    let out_of_range = || AnalysisError::LiteralOutOfRange {
        ty: target,
        value: text.to_string(),
    };
    // digits-only text that fails to parse overflowed i64
    let value: i64 = text.parse().map_err(|_| out_of_range())?;
    if !fits(target, value) {
        return Err(out_of_range());
    }
    Ok(value)
}

fn parse_float(raw: &str, target: PrimitiveType) -> std::result::Result<f64, AnalysisError> {
    let value: f64 = raw.trim().parse().map_err(|_| AnalysisError::InvalidLiteral {
        ty: target,
        value: raw.to_string(),
    })?;
    // NaN and infinity have no literal syntax
    if !value.is_finite() {
        return Err(AnalysisError::InvalidLiteral {
            ty: target,
            value: raw.to_string(),
        });
    }
    if target == PrimitiveType::Float && value.abs() > f64::from(f32::MAX) {
        return Err(AnalysisError::LiteralOutOfRange {
            ty: target,
            value: raw.trim().to_string(),
        });
    }
    // FLOAT literals carry single precision
    if target == PrimitiveType::Float {
        return Ok(f64::from(value as f32));
    }
    Ok(value)
}

fn fits(ty: PrimitiveType, value: i64) -> bool {
    ty.fixed_point_range()
        .is_some_and(|(min, max)| (min..=max).contains(&value))
}

impl Expr {
    /// Negates a numeric literal in place.
    ///
    /// An integer whose negation no longer fits the literal's type (`128`
    /// from a `TINYINT -128`) moves to the narrowest type that holds it.
    ///
    /// # Errors
    ///
    /// Returns `NotImplemented` for string and boolean literals and for
    /// non-literal nodes, and `LiteralOutOfRange` when negating `i64::MIN`.
    pub fn swap_sign(&mut self) -> Result<()> {
        let ExprKind::Literal(value) = &mut self.kind else {
            return Err(not_numeric().into());
        };
        match value {
            Value::Int(v) => {
                let negated = v.checked_neg().ok_or_else(|| AnalysisError::LiteralOutOfRange {
                    ty: self.ty,
                    value: format!("-({v})"),
                })?;
                *v = negated;
                if !fits(self.ty, negated) {
                    self.ty = PrimitiveType::smallest_fixed_point_for(negated);
                }
                Ok(())
            }
            Value::Float(f) => {
                *f = -*f;
                Ok(())
            }
            Value::Bool(_) | Value::String(_) => Err(not_numeric().into()),
        }
    }
}

fn not_numeric() -> AnalysisError {
    AnalysisError::NotImplemented("swap_sign() only implemented for numeric literals".into())
}
