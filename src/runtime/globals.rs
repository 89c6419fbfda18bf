//=====================================================
// File: globals.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Process-wide global variable table
// Objective: Share one lock-guarded table across every execution context,
//            created with the runtime and cleared only by explicit reset
//=====================================================

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::symbol::Symbol;
use crate::value::Value;

/// Writers from different scripts race; each individual read or write is
/// atomic, so entries are never torn.
#[derive(Debug, Default)]
pub struct GlobalTable {
    values: RwLock<HashMap<Symbol, Value>>,
}

impl GlobalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &Symbol) -> Option<Value> {
        self.values.read().get(name).cloned()
    }

    pub fn set(&self, name: &Symbol, value: Value) {
        self.values.write().insert(name.clone(), value);
    }

    /// Creates the global with an empty value unless it already exists.
    pub fn seed(&self, name: &Symbol) {
        self.values
            .write()
            .entry(name.clone())
            .or_insert_with(Value::empty);
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.values.read().contains_key(name)
    }

    pub fn reset(&self) {
        self.values.write().clear();
    }

    /// Name/value pairs sorted by name.
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<_> = self
            .values
            .read()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
        entries
    }
}


//=====================================================
// End of file
//=====================================================
