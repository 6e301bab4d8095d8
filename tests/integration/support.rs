use connector_settings::codec;
use connector_settings::keys::{DB_VERSION_KEY, SETTINGS_MAP};
use connector_settings::SledSettings;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

pub fn db_path(temp: &TempDir) -> PathBuf {
    temp.path().join("etc").join("settings.sled")
}

/// sled's background threads can hold the file lock for a moment after the
/// last handle is dropped, so a same-process reopen retries while that is
/// the failure.
pub fn retry_while_locked<T, E, F>(mut open: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 0;
    loop {
        match open() {
            Err(e) if attempt < 50 && e.to_string().contains("could not acquire lock") => {
                attempt += 1;
                thread::sleep(Duration::from_millis(20 * attempt.min(5)));
            }
            result => return result,
        }
    }
}

/// Activate the settings context at `path`, waiting out a previous holder.
pub fn activate(path: &Path) -> SledSettings {
    retry_while_locked(|| SledSettings::activate(path)).unwrap()
}

fn open_raw(path: &Path) -> sled::Db {
    retry_while_locked(|| sled::open(path)).unwrap()
}

/// Write raw settings records the way an older release left them on disk.
pub fn seed_store(path: &Path, version: Option<u32>, records: &[(&str, Vec<u8>)]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let db = open_raw(path);
    let tree = db.open_tree(SETTINGS_MAP).unwrap();
    if let Some(version) = version {
        tree.insert(DB_VERSION_KEY, codec::encode(DB_VERSION_KEY, &version).unwrap())
            .unwrap();
    }
    for (key, bytes) in records {
        tree.insert(*key, bytes.clone()).unwrap();
    }
    db.flush().unwrap();
}

/// Snapshot of the settings map as raw bytes, sorted by key.
pub fn raw_settings(path: &Path) -> Vec<(String, Vec<u8>)> {
    let db = open_raw(path);
    let tree = db.open_tree(SETTINGS_MAP).unwrap();
    tree.iter()
        .map(|item| {
            let (key, value) = item.unwrap();
            (String::from_utf8(key.to_vec()).unwrap(), value.to_vec())
        })
        .collect()
}

pub fn encoded<T: serde::Serialize>(key: &str, value: &T) -> Vec<u8> {
    codec::encode(key, value).unwrap()
}
