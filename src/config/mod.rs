//! Configuration for the settings host.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! `CONNECTOR_SETTINGS__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;
pub mod storage_paths;

pub use facade::ConfigLoader;
pub use storage_paths::StorageConfig;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Relative location of the optional configuration file.
pub const CONFIG_FILE: &str = "etc/connector-settings.toml";

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CONNECTOR_SETTINGS";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
