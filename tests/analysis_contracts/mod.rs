//! Contract tests for the analysis pass.

mod arithmetic_contract;
mod lattice_contract;
mod literal_contract;

use sqlsema::{PrimitiveType, Scope};

/// One column per valid type, named after the type (`tinyint_col`, ...).
pub fn typed_scope() -> Scope {
    let mut scope = Scope::new();
    for ty in PrimitiveType::VALID {
        scope.add_column(column_for(ty), ty);
    }
    scope
}

/// Name of the [`typed_scope`] column holding `ty`.
pub fn column_for(ty: PrimitiveType) -> String {
    format!("{}_col", ty.name().to_ascii_lowercase())
}
