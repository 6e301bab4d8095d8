//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::SettingsConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a host running in `base_dir`.
    pub fn load(base_dir: &Path) -> Result<SettingsConfig, ConfigError> {
        MergeService::load(base_dir)
    }
}
