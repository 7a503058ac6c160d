//! Builtin function registry
//!
//! Builtins are looked up by name before any scope, so a builtin shadows a
//! variable of the same name. Hosts register their own next to the prelude.

mod prelude;

use indexmap::IndexMap;

use crate::value::BuiltinFn;

/// Ordered table of builtins.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    table: IndexMap<String, BuiltinFn>,
}

impl Builtins {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding the standard prelude.
    pub fn with_prelude() -> Self {
        let mut builtins = Self::new();
        builtins.load_prelude();
        builtins
    }

    /// Register a builtin, replacing one of the same name.
    pub fn register(&mut self, builtin: BuiltinFn) {
        self.table.insert(builtin.name.clone(), builtin);
    }

    /// Look up a builtin by name.
    pub fn get(&self, name: &str) -> Option<&BuiltinFn> {
        self.table.get(name)
    }

    /// Check if a builtin is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Number of registered builtins.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
