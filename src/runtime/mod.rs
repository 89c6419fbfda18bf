//=====================================================
// File: runtime.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Process-wide HyperTalk runtime state
// Objective: Own the configuration, global variable table, HyperCard
//            properties, abort signal and UI host shared by every execution
//            context
//=====================================================

pub mod abort;
pub mod context;
pub mod globals;
pub mod host;
pub mod properties;

use std::sync::Arc;

use tracing::info;

use crate::config::RuntimeConfig;

pub use abort::AbortSignal;
pub use context::{ExecutionContext, Frame};
pub use globals::GlobalTable;
pub use host::{Destination, Host};
pub use properties::HyperCardProperties;

/// Created once at startup and passed by reference into every context.
pub struct Runtime {
    config: RuntimeConfig,
    globals: GlobalTable,
    properties: HyperCardProperties,
    abort: AbortSignal,
    host: Arc<dyn Host>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig, host: Arc<dyn Host>) -> Arc<Self> {
        info!(
            max_call_depth = config.max_call_depth,
            workers = config.worker_threads,
            "runtime created"
        );
        Arc::new(Self {
            properties: HyperCardProperties::new(&config),
            config,
            globals: GlobalTable::new(),
            abort: AbortSignal::new(),
            host,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn globals(&self) -> &GlobalTable {
        &self.globals
    }

    pub fn properties(&self) -> &HyperCardProperties {
        &self.properties
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// The user pressed the abort key combination.
    pub fn request_abort(&self) {
        self.abort.request();
    }

    /// Clears globals and restores HyperCard properties to their defaults.
    pub fn reset(&self) {
        self.globals.reset();
        self.properties.reset(&self.config);
        info!("runtime state reset");
    }
}

//=====================================================
// End of file
//=====================================================
