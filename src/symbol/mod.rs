//==================================================
// File: symbol.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Case-insensitive identifiers for HyperTalk variables and handlers
// Objective: Provide Symbol struct that keeps the spelling a script used while
//            comparing and hashing by its folded form
//==================================================

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A HyperTalk identifier. `Counter`, `counter` and `COUNTER` are the same
/// symbol; the original spelling is kept for bare-word literals.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol {
    spelling: String,
    folded: String,
}

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self {
            spelling: name.to_string(),
            folded: name.to_lowercase(),
        }
    }

    /// The name exactly as the script wrote it.
    pub fn as_str(&self) -> &str {
        &self.spelling
    }

    /// Lower-cased key used for table lookups.
    pub fn key(&self) -> &str {
        &self.folded
    }

    pub fn matches(&self, other: &str) -> bool {
        self.folded == other.to_lowercase()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.folded
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol::new(&value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.spelling
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}


//==================================================
// End of file
//==================================================
