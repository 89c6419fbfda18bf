//=====================================================
// File: properties.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Named property storage for document components
// Objective: Hold each component's defined properties and their read-only
//            flags, signalling a typed failure for unknown names
//=====================================================

use std::collections::{HashMap, HashSet};

use crate::interpreter::errors::{HtError, HtResult};
use crate::value::Value;

/// Properties are keyed by lower-cased name; the table never invents one.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    values: HashMap<String, Value>,
    read_only: HashSet<String>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_lowercase(), value.into());
    }

    pub fn define_read_only(&mut self, name: &str, value: impl Into<Value>) {
        self.define(name, value);
        self.read_only.insert(name.to_lowercase());
    }

    pub fn get(&self, name: &str) -> HtResult<Value> {
        self.values
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| HtError::no_such_property(name))
    }

    pub fn set(&mut self, name: &str, value: Value) -> HtResult<()> {
        let key = name.to_lowercase();
        if self.read_only.contains(&key) {
            return Err(HtError::semantic(format!("Can't set property {name}.")));
        }
        match self.values.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(HtError::no_such_property(name)),
        }
    }
}


//=====================================================
// End of file
//=====================================================
