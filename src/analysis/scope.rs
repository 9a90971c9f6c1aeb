//! Column scope for slot resolution.

use std::collections::HashMap;

use crate::types::PrimitiveType;

/// Columns visible to an expression, keyed case-insensitively.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Lowercased column name -> slot.
    columns: HashMap<String, SlotDescriptor>,
    /// Enclosing scope for correlated references.
    parent: Option<Box<Scope>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Creates a new empty scope.
    #[must_use]
    pub fn new() -> Self {
        Scope {
            columns: HashMap::new(),
            parent: None,
        }
    }

    /// Creates a child scope with this scope as parent.
    #[must_use]
    pub fn child(&self) -> Self {
        Scope {
            columns: HashMap::new(),
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Adds a column, shadowing any column of the same name in parent scopes.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is the invalid sentinel.
    pub fn add_column(&mut self, name: impl Into<String>, ty: PrimitiveType) {
        self.add_slot(SlotDescriptor::new(name, ty));
    }

    pub fn add_slot(&mut self, slot: SlotDescriptor) {
        self.columns.insert(slot.name.to_ascii_lowercase(), slot);
    }

    /// Builder-style [`Scope::add_column`].
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, ty: PrimitiveType) -> Self {
        self.add_column(name, ty);
        self
    }

    /// Looks up a column by name, checking parent scopes if not found.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&SlotDescriptor> {
        if let Some(slot) = self.columns.get(&name.to_ascii_lowercase()) {
            return Some(slot);
        }
        if let Some(ref parent) = self.parent {
            return parent.lookup(name);
        }
        None
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Returns the column names declared in this scope (not including parents).
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.values().map(|slot| slot.name.as_str()).collect()
    }

    /// Returns the columns declared in this scope (not including parents).
    pub fn columns(&self) -> impl Iterator<Item = &SlotDescriptor> {
        self.columns.values()
    }
}

/// A resolved column: its declared name and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub name: String,
    pub ty: PrimitiveType,
}

impl SlotDescriptor {
    /// # Panics
    ///
    /// Panics if `ty` is the invalid sentinel.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: PrimitiveType) -> Self {
        assert!(ty.is_valid(), "slot must have a valid type");
        SlotDescriptor {
            name: name.into(),
            ty,
        }
    }
}
