//=====================================================
// File: properties.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: HyperCard-level properties
// Objective: Hold the runtime-wide properties scripts read and set without
//            naming a part, including ones computed from the UI
//=====================================================

use parking_lot::RwLock;
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::document::PropertyTable;
use crate::interpreter::errors::{HtError, HtResult};
use crate::runtime::host::Host;
use crate::value::Value;

pub struct HyperCardProperties {
    table: RwLock<PropertyTable>,
}

impl HyperCardProperties {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            table: RwLock::new(Self::defaults(config)),
        }
    }

    fn defaults(config: &RuntimeConfig) -> PropertyTable {
        let mut table = PropertyTable::new();
        table.define("itemDelimiter", config.item_delimiter.as_str());
        table.define("lockScreen", false);
        table.define("lockMessages", false);
        table.define("userLevel", 5);
        table.define_read_only("systemVersion", env!("CARGO_PKG_VERSION"));
        table
    }

    pub fn reset(&self, config: &RuntimeConfig) {
        *self.table.write() = Self::defaults(config);
    }

    pub fn get(&self, name: &str, host: &dyn Host) -> HtResult<Value> {
        if name.eq_ignore_ascii_case("selectedText") {
            // Informational only: a failed UI query reads as empty.
            return Ok(host.selected_text().unwrap_or_else(|err| {
                debug!(%err, "selectedText query failed");
                Value::empty()
            }));
        }
        self.table.read().get(name)
    }

    pub fn set(&self, name: &str, value: Value) -> HtResult<()> {
        if name.eq_ignore_ascii_case("selectedText") {
            return Err(HtError::semantic(format!("Can't set property {name}.")));
        }
        if name.eq_ignore_ascii_case("itemDelimiter") && value.is_empty() {
            return Err(HtError::semantic("The itemDelimiter can't be empty."));
        }
        self.table.write().set(name, value)
    }

    pub fn item_delimiter(&self) -> String {
        self.table
            .read()
            .get("itemDelimiter")
            .map(Value::into_string)
            .unwrap_or_else(|_| ",".to_string())
    }

    pub fn lock_messages(&self) -> bool {
        self.table
            .read()
            .get("lockMessages")
            .and_then(|value| value.boolean_value())
            .unwrap_or(false)
    }
}

//=====================================================
// End of file
//=====================================================
