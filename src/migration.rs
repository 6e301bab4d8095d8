//! Migration Engine
//!
//! Moves the on-disk schema forward one version at a time. A step stages its
//! rewrites in a [`sled::Batch`]; the engine appends the version bump to the
//! same batch, applies it atomically to the settings map and flushes before
//! running the next step. An interrupted migration resumes from the last
//! completed version.

use crate::codec;
use crate::error::StorageError;
use crate::keys::{
    CONNECTOR_PROFILE_KEY, CONNECTOR_SETTINGS_KEY, DAT_KEY, DB_VERSION_KEY, SETTINGS_MAP,
};
use crate::store::Store;
use crate::types::{ConnectorConfig, ConnectorProfile, DAPS_URL, LEGACY_DAPS_URL};
use tracing::{error, info, warn};

/// Schema version written by this build.
pub const CURRENT_DB_VERSION: u32 = 4;

/// Version assumed for a store without a version record.
pub const INITIAL_DB_VERSION: u32 = 1;

/// Outcome of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub steps_applied: u32,
    /// Stored version is newer than this build understands
    pub future_version: bool,
}

struct MigrationStep {
    from: u32,
    description: &'static str,
    stage: fn(&sled::Tree, &mut sled::Batch) -> Result<(), StorageError>,
}

const STEPS: &[MigrationStep] = &[
    MigrationStep {
        from: 1,
        description: "drop unreadable connector profile",
        stage: drop_corrupt_profile,
    },
    MigrationStep {
        from: 2,
        description: "retire dynamic attribute token",
        stage: retire_dynamic_attribute_token,
    },
    MigrationStep {
        from: 3,
        description: "move identity provider to v2 endpoint",
        stage: upgrade_daps_url,
    },
];

/// Schema version recorded in the store, [`INITIAL_DB_VERSION`] when absent.
pub fn stored_version(store: &Store) -> Result<u32, StorageError> {
    let version = store
        .map::<u32>(SETTINGS_MAP)?
        .get_or_default(DB_VERSION_KEY, INITIAL_DB_VERSION)?;
    if version < INITIAL_DB_VERSION {
        warn!(version, "Stored schema version below 1, treating as 1");
        return Ok(INITIAL_DB_VERSION);
    }
    Ok(version)
}

/// Run every pending step up to [`CURRENT_DB_VERSION`].
pub fn migrate(store: &Store) -> Result<MigrationReport, StorageError> {
    let from_version = stored_version(store)?;
    let mut report = MigrationReport {
        from_version,
        to_version: from_version,
        steps_applied: 0,
        future_version: false,
    };

    if from_version > CURRENT_DB_VERSION {
        warn!(
            stored = from_version,
            supported = CURRENT_DB_VERSION,
            "Settings database is newer than supported version, data loss or errors are possible"
        );
        report.future_version = true;
        return Ok(report);
    }

    let mut version = from_version;
    while version < CURRENT_DB_VERSION {
        info!(
            from = version,
            to = CURRENT_DB_VERSION,
            "Migrating settings database"
        );
        if let Err(e) = store.with_tree(SETTINGS_MAP, |db, tree| run_step(db, tree, version)) {
            error!(from = version, error = %e, "Settings migration failed");
            return Err(StorageError::Migration {
                from: version,
                source: Box::new(e),
            });
        }
        version += 1;
        report.steps_applied += 1;
        report.to_version = version;
        info!(version, "Migration step successful");
    }

    Ok(report)
}

fn run_step(db: &sled::Db, tree: &sled::Tree, from: u32) -> Result<(), StorageError> {
    let step = STEPS
        .iter()
        .find(|step| step.from == from)
        .ok_or(StorageError::MissingMigration(from))?;
    info!(from, step = step.description, "Applying migration step");

    let mut batch = sled::Batch::default();
    (step.stage)(tree, &mut batch)?;
    batch.insert(DB_VERSION_KEY, codec::encode(DB_VERSION_KEY, &(from + 1))?);

    tree.apply_batch(batch)?;
    db.flush()?;
    Ok(())
}

/// v1 -> v2: a profile written by an older format no longer decodes. Rebuild
/// the settings map from every other entry.
fn drop_corrupt_profile(tree: &sled::Tree, batch: &mut sled::Batch) -> Result<(), StorageError> {
    let Some(bytes) = tree.get(CONNECTOR_PROFILE_KEY)? else {
        return Ok(());
    };
    match codec::decode::<ConnectorProfile>(SETTINGS_MAP, CONNECTOR_PROFILE_KEY, &bytes) {
        Ok(_) => Ok(()),
        Err(e) if e.is_corrupt_record() => {
            warn!(error = %e, "Connector profile unreadable, rebuilding settings map without it");
            let mut retained = Vec::new();
            for item in tree.iter() {
                let (key, value) = item?;
                batch.remove(key.clone());
                if &key[..] != CONNECTOR_PROFILE_KEY.as_bytes() {
                    retained.push((key, value));
                }
            }
            for (key, value) in retained {
                batch.insert(key, value);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// v2 -> v3
fn retire_dynamic_attribute_token(
    _tree: &sled::Tree,
    batch: &mut sled::Batch,
) -> Result<(), StorageError> {
    batch.remove(DAT_KEY);
    Ok(())
}

/// v3 -> v4: configurations still pointing at the legacy DAPS root move to
/// the v2 endpoint. Every other field is kept.
fn upgrade_daps_url(tree: &sled::Tree, batch: &mut sled::Batch) -> Result<(), StorageError> {
    let Some(bytes) = tree.get(CONNECTOR_SETTINGS_KEY)? else {
        return Ok(());
    };
    let mut config: ConnectorConfig =
        codec::decode(SETTINGS_MAP, CONNECTOR_SETTINGS_KEY, &bytes)?;
    if config.daps_url == LEGACY_DAPS_URL {
        config.daps_url = DAPS_URL.to_string();
        batch.insert(
            CONNECTOR_SETTINGS_KEY,
            codec::encode(CONNECTOR_SETTINGS_KEY, &config)?,
        );
    }
    Ok(())
}
