use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StoreConfig;

static CONFIG: OnceLock<ArcSwap<StoreConfig>> = OnceLock::new();

fn slot() -> &'static ArcSwap<StoreConfig> {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StoreConfig::load()))
}

/// Get the global configuration instance
///
/// Loads on first access if `init_config()` was never called. Returns an Arc
/// pointer which is cheap to clone and doesn't hold any locks.
pub fn get_config() -> Arc<StoreConfig> {
    slot().load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from "linkstore.toml" in the current directory plus
/// `LINKSTORE__*` environment variables. Missing file means defaults.
///
/// # Examples
/// ```no_run
/// use linkstore::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    let _ = slot();
}

/// Replace the global configuration, e.g. after re-reading the file.
///
/// Stores built earlier keep the settings they were constructed with.
pub fn update_config(config: StoreConfig) {
    slot().store(Arc::new(config));
}
