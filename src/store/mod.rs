//! Persistent Store
//!
//! Owns the sled database handle and hands out named maps over it. Every map
//! is a sled tree opened lazily on first access and cached until the store is
//! closed. sled logs writes before applying them; [`Store::commit`] flushes
//! them to disk.

pub mod map;

pub use map::NamedMap;

use crate::error::StorageError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared state behind every [`Store`] clone and every [`NamedMap`].
pub(crate) struct StoreInner {
    path: PathBuf,
    /// `None` once the store has been closed
    db: RwLock<Option<sled::Db>>,
    trees: RwLock<HashMap<&'static str, sled::Tree>>,
}

impl StoreInner {
    pub(crate) fn ensure_open(&self) -> Result<(), StorageError> {
        if self.db.read().is_some() {
            Ok(())
        } else {
            Err(StorageError::Closed)
        }
    }

    /// Run `op` against the tree called `name` while holding the database
    /// read lock, so `close` cannot release the database mid-operation.
    ///
    /// No tree handle outlives the call; only the cache in `trees` keeps one,
    /// and `close` clears it.
    pub(crate) fn with_tree<T, F>(&self, name: &'static str, op: F) -> Result<T, StorageError>
    where
        F: FnOnce(&sled::Db, &sled::Tree) -> Result<T, StorageError>,
    {
        let db = self.db.read();
        let db = db.as_ref().ok_or(StorageError::Closed)?;
        let tree = self.cached_tree(db, name)?;
        op(db, &tree)
    }

    // Lock order: `db` before `trees`.
    fn cached_tree(&self, db: &sled::Db, name: &'static str) -> Result<sled::Tree, StorageError> {
        if let Some(tree) = self.trees.read().get(name).cloned() {
            return Ok(tree);
        }

        let mut trees = self.trees.write();
        // Another caller may have opened it while we waited for the write lock
        if let Some(tree) = trees.get(name) {
            return Ok(tree.clone());
        }
        let tree = db.open_tree(name)?;
        debug!(map = name, "Opened named map");
        trees.insert(name, tree.clone());
        Ok(tree)
    }

    pub(crate) fn commit(&self) -> Result<(), StorageError> {
        let db = self.db.read();
        let db = db.as_ref().ok_or(StorageError::Closed)?;
        db.flush()?;
        Ok(())
    }
}

/// Handle to the on-disk settings database.
///
/// Cloning is cheap; all clones share the same database and map cache.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath(
                "settings database path is empty".to_string(),
            ));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = sled::Config::new().path(&path).open()?;
        debug!(path = %path.display(), "Opened settings database");

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                db: RwLock::new(Some(db)),
                trees: RwLock::new(HashMap::new()),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn is_open(&self) -> bool {
        self.inner.ensure_open().is_ok()
    }

    /// Typed view over the map called `name`.
    ///
    /// Several views with different value types may share one map; the
    /// generic settings map relies on this to hold mixed records.
    pub fn map<V>(&self, name: &'static str) -> Result<NamedMap<V>, StorageError>
    where
        V: Serialize + DeserializeOwned,
    {
        self.inner.with_tree(name, |_, _| Ok(()))?;
        Ok(NamedMap::new(name, Arc::clone(&self.inner)))
    }

    /// Run `op` against the raw sled tree for `name` under the database read
    /// lock. `op` receives the database so it can flush without relocking.
    pub(crate) fn with_tree<T, F>(&self, name: &'static str, op: F) -> Result<T, StorageError>
    where
        F: FnOnce(&sled::Db, &sled::Tree) -> Result<T, StorageError>,
    {
        self.inner.with_tree(name, op)
    }

    /// Durably flush every write made since the last commit.
    pub fn commit(&self) -> Result<(), StorageError> {
        self.inner.commit()
    }

    /// Flush and release the database. Any later operation fails with
    /// [`StorageError::Closed`].
    pub fn close(&self) -> Result<(), StorageError> {
        let db = self.inner.db.write().take().ok_or(StorageError::Closed)?;
        self.inner.trees.write().clear();
        debug!(path = %self.inner.path.display(), "Closing settings database");
        db.flush()?;
        Ok(())
    }
}
