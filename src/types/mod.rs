//! Type definitions for sqlsema.

mod primitive;
mod value;

pub use primitive::{assignment_compatible_type, PrimitiveType, TypeCategory};
pub use value::Value;
