//! MergeService: orchestrates sources and deserializes to SettingsConfig.

use super::builder_with_defaults;
use crate::config::sources::{environment, file};
use crate::config::SettingsConfig;
use config::ConfigError;
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> `etc/connector-settings.toml` under
    /// `base_dir` -> environment (highest).
    pub fn load(base_dir: &Path) -> Result<SettingsConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = file::add_to_builder(builder, &base_dir.join(crate::config::CONFIG_FILE))?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
