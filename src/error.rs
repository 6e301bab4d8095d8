//! Error types for the settings store.

use thiserror::Error;

/// Errors raised by the persistent store, its named maps and the migration engine.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// A stored record could not be decoded into the requested type.
    #[error("Corrupt record {key:?} in map {map}: {source}")]
    CorruptRecord {
        map: String,
        key: String,
        #[source]
        source: bincode::Error,
    },

    #[error("Failed to encode value for key {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: bincode::Error,
    },

    /// Operation attempted after the store was closed.
    #[error("Settings store is closed")]
    Closed,

    #[error("Migration from schema version {from} failed: {source}")]
    Migration {
        from: u32,
        #[source]
        source: Box<StorageError>,
    },

    #[error("No migration step from schema version {0}")]
    MissingMigration(u32),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    /// True for decode failures of a single record.
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, StorageError::CorruptRecord { .. })
    }
}

/// Errors surfaced by the settings facade and the ambient layers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
