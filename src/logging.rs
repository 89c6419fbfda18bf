//=====================================================
// File: logging.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Tracing setup for the HyperTalk runtime
// Objective: Install one compact fmt subscriber whose filter comes from the
//            runtime configuration unless RUST_LOG overrides it
//=====================================================

use once_cell::sync::OnceCell;

use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(default_filter: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init();
    });
    tracing::debug!(filter = default_filter, "tracing initialised");
}

//=====================================================
// End of file
//=====================================================
