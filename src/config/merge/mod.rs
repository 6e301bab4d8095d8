//! Merge policy: defaults every source is layered over.

pub mod service;

use crate::keys::DEFAULT_DB_PATH;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder pre-seeded with the defaults of every scalar setting.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("storage.db_path", DEFAULT_DB_PATH)?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("logging.color", true)
}
