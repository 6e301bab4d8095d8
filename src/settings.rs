//! Settings facade
//!
//! [`SledSettings`] is the single settings context of a process. It is built
//! by [`SledSettings::activate`], which opens the store and migrates it before
//! any caller can see it, and torn down by [`SledSettings::deactivate`] or,
//! failing that, when it is dropped.

use crate::accessor::{CONNECTOR_CONFIG, CONNECTOR_JSON_LD, CONNECTOR_PROFILE};
use crate::connection::ConnectionResolver;
use crate::error::ApiError;
use crate::keys::{CONTRACT_MAP, USER_MAP};
use crate::migration::{self, MigrationReport};
use crate::store::{NamedMap, Store};
use crate::types::{ConnectionSettings, ConnectorConfig, ConnectorProfile};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, warn};

/// Read/write access to the connector's persistent settings.
pub trait Settings: Send + Sync {
    fn connector_config(&self) -> Result<ConnectorConfig, ApiError>;
    fn set_connector_config(&self, config: &ConnectorConfig) -> Result<(), ApiError>;

    fn connector_profile(&self) -> Result<ConnectorProfile, ApiError>;
    fn set_connector_profile(&self, profile: &ConnectorProfile) -> Result<(), ApiError>;

    fn connector_json_ld(&self) -> Result<Option<String>, ApiError>;
    /// `None` deletes the stored document.
    fn set_connector_json_ld(&self, json_ld: Option<&str>) -> Result<(), ApiError>;

    fn connection_settings(&self, connection: &str) -> Result<ConnectionSettings, ApiError>;
    fn set_connection_settings(
        &self,
        connection: &str,
        settings: &ConnectionSettings,
    ) -> Result<(), ApiError>;
    fn all_connection_settings(&self) -> Result<BTreeMap<String, ConnectionSettings>, ApiError>;

    fn is_user_store_empty(&self) -> Result<bool, ApiError>;
    fn user_hash(&self, username: &str) -> Result<Option<String>, ApiError>;
    fn save_user(&self, username: &str, hash: &str) -> Result<(), ApiError>;
    fn users(&self) -> Result<BTreeMap<String, String>, ApiError>;
    fn remove_user(&self, username: &str) -> Result<(), ApiError>;

    fn store_contract(&self, key: &str, contract: &str) -> Result<(), ApiError>;
    fn load_contract(&self, key: &str) -> Result<Option<String>, ApiError>;
}

/// Settings backed by a sled database.
pub struct SledSettings {
    store: Store,
    connections: ConnectionResolver,
    migration: MigrationReport,
}

impl SledSettings {
    /// Open the store at `path` and migrate it to the current schema version.
    ///
    /// On migration failure the store is closed again and the error returned;
    /// it must abort startup.
    pub fn activate<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Open settings database");
        let store = Store::open(path)?;

        let migration = match migration::migrate(&store) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Settings database could not be migrated");
                if let Err(close_err) = store.close() {
                    warn!(error = %close_err, "Failed to close settings database after migration error");
                }
                return Err(e.into());
            }
        };

        Ok(Self {
            connections: ConnectionResolver::new(store.clone()),
            store,
            migration,
        })
    }

    /// Close the store. Later calls on this context fail with a closed-store error.
    pub fn deactivate(&self) -> Result<(), ApiError> {
        debug!("Close settings database");
        self.store.close()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.store.is_open()
    }

    pub fn migration_report(&self) -> MigrationReport {
        self.migration
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn users_map(&self) -> Result<NamedMap<String>, ApiError> {
        Ok(self.store.map(USER_MAP)?)
    }

    fn contracts_map(&self) -> Result<NamedMap<String>, ApiError> {
        Ok(self.store.map(CONTRACT_MAP)?)
    }
}

impl Drop for SledSettings {
    fn drop(&mut self) {
        if self.store.is_open() {
            if let Err(e) = self.deactivate() {
                warn!(error = %e, "Failed to close settings database on drop");
            }
        }
    }
}

impl Settings for SledSettings {
    fn connector_config(&self) -> Result<ConnectorConfig, ApiError> {
        Ok(CONNECTOR_CONFIG.get(&self.store)?)
    }

    fn set_connector_config(&self, config: &ConnectorConfig) -> Result<(), ApiError> {
        Ok(CONNECTOR_CONFIG.set(&self.store, config)?)
    }

    fn connector_profile(&self) -> Result<ConnectorProfile, ApiError> {
        Ok(CONNECTOR_PROFILE.get(&self.store)?)
    }

    fn set_connector_profile(&self, profile: &ConnectorProfile) -> Result<(), ApiError> {
        Ok(CONNECTOR_PROFILE.set(&self.store, profile)?)
    }

    fn connector_json_ld(&self) -> Result<Option<String>, ApiError> {
        Ok(CONNECTOR_JSON_LD.get(&self.store)?)
    }

    fn set_connector_json_ld(&self, json_ld: Option<&str>) -> Result<(), ApiError> {
        let json_ld = json_ld.map(str::to_string);
        Ok(CONNECTOR_JSON_LD.set(&self.store, json_ld.as_ref())?)
    }

    fn connection_settings(&self, connection: &str) -> Result<ConnectionSettings, ApiError> {
        Ok(self.connections.get(connection)?)
    }

    fn set_connection_settings(
        &self,
        connection: &str,
        settings: &ConnectionSettings,
    ) -> Result<(), ApiError> {
        Ok(self.connections.set(connection, settings)?)
    }

    fn all_connection_settings(&self) -> Result<BTreeMap<String, ConnectionSettings>, ApiError> {
        Ok(self.connections.all()?)
    }

    fn is_user_store_empty(&self) -> Result<bool, ApiError> {
        Ok(self.users_map()?.is_empty()?)
    }

    fn user_hash(&self, username: &str) -> Result<Option<String>, ApiError> {
        Ok(self.users_map()?.get(username)?)
    }

    fn save_user(&self, username: &str, hash: &str) -> Result<(), ApiError> {
        Ok(self.users_map()?.put(username, &hash.to_string())?)
    }

    fn users(&self) -> Result<BTreeMap<String, String>, ApiError> {
        Ok(self.users_map()?.entries()?)
    }

    fn remove_user(&self, username: &str) -> Result<(), ApiError> {
        self.users_map()?.remove(username)?;
        Ok(())
    }

    fn store_contract(&self, key: &str, contract: &str) -> Result<(), ApiError> {
        Ok(self.contracts_map()?.put(key, &contract.to_string())?)
    }

    fn load_contract(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.contracts_map()?.get(key)?)
    }
}
