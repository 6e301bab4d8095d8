//! Connection-Settings Resolver
//!
//! Connections without their own entry inherit the general entry. The
//! inherited copy is persisted on first read, so later changes to the general
//! entry do not leak into connections that were already resolved.

use crate::error::StorageError;
use crate::keys::{CONNECTION_SETTINGS_MAP, GENERAL_CONFIG};
use crate::store::{NamedMap, Store};
use crate::types::ConnectionSettings;
use std::collections::BTreeMap;
use tracing::debug;

pub struct ConnectionResolver {
    store: Store,
}

impl ConnectionResolver {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn map(&self) -> Result<NamedMap<ConnectionSettings>, StorageError> {
        self.store.map(CONNECTION_SETTINGS_MAP)
    }

    /// Settings for `connection`, materializing the general fallback if needed.
    pub fn get(&self, connection: &str) -> Result<ConnectionSettings, StorageError> {
        let map = self.map()?;
        if connection == GENERAL_CONFIG {
            return map.get_or_compute(GENERAL_CONFIG, || Ok(ConnectionSettings::default()));
        }
        map.get_or_compute(connection, || {
            debug!(connection, "No connection settings stored, copying general entry");
            self.get(GENERAL_CONFIG)
        })
    }

    pub fn set(&self, connection: &str, settings: &ConnectionSettings) -> Result<(), StorageError> {
        self.map()?.put(connection, settings)
    }

    /// Snapshot of every stored entry, general entry included if created.
    pub fn all(&self) -> Result<BTreeMap<String, ConnectionSettings>, StorageError> {
        self.map()?.entries()
    }
}
