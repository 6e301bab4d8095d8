//! Named Maps
//!
//! String-keyed views over a single sled tree. Values go through the blob
//! codec. Each mutating call commits before returning; atomicity is per key.

use super::StoreInner;
use crate::codec;
use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed handle to one named map of a [`Store`](super::Store).
///
/// Holds no database handle of its own; every call looks the tree up under
/// the store's lock and fails with [`StorageError::Closed`] once the store
/// is closed.
pub struct NamedMap<V> {
    name: &'static str,
    store: Arc<StoreInner>,
    _value: PhantomData<fn() -> V>,
}

impl<V> NamedMap<V>
where
    V: Serialize + DeserializeOwned,
{
    pub(crate) fn new(name: &'static str, store: Arc<StoreInner>) -> Self {
        Self {
            name,
            store,
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, key: &str, bytes: &[u8]) -> Result<V, StorageError> {
        codec::decode(self.name, key, bytes)
    }

    pub fn get(&self, key: &str) -> Result<Option<V>, StorageError> {
        let bytes = self.store.with_tree(self.name, |_, tree| Ok(tree.get(key)?))?;
        match bytes {
            Some(bytes) => Ok(Some(self.decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Stored value, or `default` without persisting it.
    pub fn get_or_default(&self, key: &str, default: V) -> Result<V, StorageError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Stored value, or the producer's value after persisting it.
    ///
    /// The insert only happens if the key is still absent; when another
    /// caller wins the race its value is returned instead. The producer runs
    /// without any store lock held, so it may read the store itself.
    pub fn get_or_compute<F>(&self, key: &str, producer: F) -> Result<V, StorageError>
    where
        F: FnOnce() -> Result<V, StorageError>,
    {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = producer()?;
        let bytes = codec::encode(key, &value)?;
        let winner = self.store.with_tree(self.name, |db, tree| loop {
            match tree.compare_and_swap(key, None::<&[u8]>, Some(bytes.as_slice()))? {
                Ok(()) => {
                    db.flush()?;
                    return Ok(None);
                }
                Err(conflict) => {
                    if let Some(current) = conflict.current {
                        return Ok(Some(current));
                    }
                    // Removed again between the failed swap and now
                }
            }
        })?;
        match winner {
            Some(current) => self.decode(key, &current),
            None => Ok(value),
        }
    }

    pub fn put(&self, key: &str, value: &V) -> Result<(), StorageError> {
        let bytes = codec::encode(key, value)?;
        self.store.with_tree(self.name, |db, tree| {
            tree.insert(key, bytes)?;
            db.flush()?;
            Ok(())
        })
    }

    /// Delete `key`. Returns whether a record was present.
    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.store.with_tree(self.name, |db, tree| {
            let existed = tree.remove(key)?.is_some();
            db.flush()?;
            Ok(existed)
        })
    }

    pub fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        self.store
            .with_tree(self.name, |_, tree| Ok(tree.contains_key(key)?))
    }

    pub fn keys(&self) -> Result<BTreeSet<String>, StorageError> {
        self.store.with_tree(self.name, |_, tree| {
            let mut keys = BTreeSet::new();
            for item in tree.iter() {
                let (key, _) = item?;
                keys.insert(String::from_utf8_lossy(&key).into_owned());
            }
            Ok(keys)
        })
    }

    /// Snapshot of every entry, decoded as `V`.
    pub fn entries(&self) -> Result<BTreeMap<String, V>, StorageError> {
        let raw = self.store.with_tree(self.name, |_, tree| {
            tree.iter()
                .map(|item| item.map_err(StorageError::from))
                .collect::<Result<Vec<_>, _>>()
        })?;
        let mut entries = BTreeMap::new();
        for (key, bytes) in raw {
            let key = String::from_utf8_lossy(&key).into_owned();
            let value = self.decode(&key, &bytes)?;
            entries.insert(key, value);
        }
        Ok(entries)
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        self.store.with_tree(self.name, |_, tree| Ok(tree.len()))
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        self.store.with_tree(self.name, |_, tree| Ok(tree.is_empty()))
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.with_tree(self.name, |db, tree| {
            tree.clear()?;
            db.flush()?;
            Ok(())
        })
    }
}
