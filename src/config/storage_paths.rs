//! StorageConfig and path resolution for the settings database.

use crate::keys::DEFAULT_DB_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Settings database location, relative to the base directory unless absolute
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl StorageConfig {
    pub fn resolve_db_path(&self, base_dir: &Path) -> PathBuf {
        if self.db_path.is_absolute() {
            self.db_path.clone()
        } else {
            base_dir.join(&self.db_path)
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}
