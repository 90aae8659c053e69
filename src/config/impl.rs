use std::sync::{Arc, OnceLock};

use super::{DEFAULT_CONFIG_PATH, StaticConfig};

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone.
/// Falls back to loading from the default path when `init_config` has not run.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::load(DEFAULT_CONFIG_PATH)))
        .clone()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (or "config.toml" when `None`).
/// If the file doesn't exist, uses in-memory defaults plus COVID__* env overrides.
/// Only the first call has any effect.
///
/// # Examples
/// ```no_run
/// use covidmap::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| Arc::new(StaticConfig::load(path.unwrap_or(DEFAULT_CONFIG_PATH))));
}
