//! Typed accessors over the generic settings map.

use crate::error::StorageError;
use crate::keys::{
    CONNECTOR_JSON_LD_KEY, CONNECTOR_PROFILE_KEY, CONNECTOR_SETTINGS_KEY, SETTINGS_MAP,
};
use crate::store::Store;
use crate::types::{ConnectorConfig, ConnectorProfile};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A setting that always has a value.
///
/// Reading a missing key persists the default, so later direct map reads see
/// it as well.
pub struct RequiredSetting<T> {
    key: &'static str,
    default: fn() -> T,
}

impl<T> RequiredSetting<T>
where
    T: Serialize + DeserializeOwned,
{
    pub const fn new(key: &'static str, default: fn() -> T) -> Self {
        Self { key, default }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn get(&self, store: &Store) -> Result<T, StorageError> {
        store
            .map::<T>(SETTINGS_MAP)?
            .get_or_compute(self.key, || Ok((self.default)()))
    }

    pub fn set(&self, store: &Store, value: &T) -> Result<(), StorageError> {
        store.map::<T>(SETTINGS_MAP)?.put(self.key, value)
    }
}

/// A setting that may be absent. Writing `None` deletes the record.
pub struct OptionalSetting<T> {
    key: &'static str,
    _value: std::marker::PhantomData<fn() -> T>,
}

impl<T> OptionalSetting<T>
where
    T: Serialize + DeserializeOwned,
{
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _value: std::marker::PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn get(&self, store: &Store) -> Result<Option<T>, StorageError> {
        store.map::<T>(SETTINGS_MAP)?.get(self.key)
    }

    pub fn set(&self, store: &Store, value: Option<&T>) -> Result<(), StorageError> {
        let map = store.map::<T>(SETTINGS_MAP)?;
        match value {
            Some(value) => map.put(self.key, value),
            None => map.remove(self.key).map(|_| ()),
        }
    }
}

pub const CONNECTOR_CONFIG: RequiredSetting<ConnectorConfig> =
    RequiredSetting::new(CONNECTOR_SETTINGS_KEY, ConnectorConfig::default);

pub const CONNECTOR_PROFILE: RequiredSetting<ConnectorProfile> =
    RequiredSetting::new(CONNECTOR_PROFILE_KEY, ConnectorProfile::default);

pub const CONNECTOR_JSON_LD: OptionalSetting<String> = OptionalSetting::new(CONNECTOR_JSON_LD_KEY);
