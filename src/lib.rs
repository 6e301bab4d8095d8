//! Connector Settings: Persistent Configuration Store
//!
//! An embedded, transactional key-value store for a connector node's
//! configuration. Values survive restarts, typed accessors cover the
//! well-known configuration records, and a migration engine carries older
//! on-disk data forward to the current schema version on activation.

pub mod accessor;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod keys;
pub mod logging;
pub mod migration;
pub mod settings;
pub mod store;
pub mod types;

pub use error::{ApiError, StorageError};
pub use settings::{Settings, SledSettings};
