use crate::support::{activate, db_path, encoded, raw_settings, retry_while_locked, seed_store};
use connector_settings::keys::{
    CONNECTOR_JSON_LD_KEY, CONNECTOR_PROFILE_KEY, CONNECTOR_SETTINGS_KEY, DAT_KEY,
    DB_VERSION_KEY,
};
use connector_settings::migration::CURRENT_DB_VERSION;
use connector_settings::types::{ConnectorConfig, ConnectorProfile, DAPS_URL, LEGACY_DAPS_URL};
use connector_settings::{ApiError, Settings, SledSettings, StorageError};
use tempfile::TempDir;

fn custom_config(daps_url: &str) -> ConnectorConfig {
    ConnectorConfig {
        broker_url: "https://broker.example".to_string(),
        ttp_port: 9443,
        keystore_name: "consumer-keystore.p12".to_string(),
        daps_url: daps_url.to_string(),
        ..ConnectorConfig::default()
    }
}

fn without_version(records: Vec<(String, Vec<u8>)>) -> Vec<(String, Vec<u8>)> {
    records
        .into_iter()
        .filter(|(key, _)| key != DB_VERSION_KEY)
        .collect()
}

#[test]
fn corrupt_profile_is_discarded_from_version_1() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    seed_store(
        &path,
        Some(1),
        &[
            (CONNECTOR_PROFILE_KEY, vec![0xde, 0xad]),
            (CONNECTOR_SETTINGS_KEY, encoded(CONNECTOR_SETTINGS_KEY, &custom_config(DAPS_URL))),
            (CONNECTOR_JSON_LD_KEY, encoded(CONNECTOR_JSON_LD_KEY, &"{}".to_string())),
            ("custom_counter", encoded("custom_counter", &42u64)),
        ],
    );
    let before = without_version(raw_settings(&path))
        .into_iter()
        .filter(|(key, _)| key != CONNECTOR_PROFILE_KEY)
        .collect::<Vec<_>>();

    let settings = activate(&path);
    let report = settings.migration_report();
    assert_eq!(report.from_version, 1);
    assert_eq!(report.to_version, CURRENT_DB_VERSION);
    assert_eq!(report.steps_applied, 3);
    settings.deactivate().unwrap();
    drop(settings);

    let after = raw_settings(&path);
    assert!(after.iter().all(|(key, _)| key != CONNECTOR_PROFILE_KEY));
    assert_eq!(without_version(after.clone()), before);
    let version = after.iter().find(|(key, _)| key == DB_VERSION_KEY).unwrap();
    assert_eq!(version.1, encoded(DB_VERSION_KEY, &CURRENT_DB_VERSION));
}

#[test]
fn missing_version_is_migrated_like_version_1() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    seed_store(&path, None, &[(CONNECTOR_PROFILE_KEY, vec![0x01])]);

    let settings = activate(&path);
    assert_eq!(settings.migration_report().from_version, 1);
    assert_eq!(settings.migration_report().to_version, CURRENT_DB_VERSION);
    assert_eq!(
        settings.connector_profile().unwrap(),
        ConnectorProfile::default(),
        "profile should be rebuilt from the default after the corrupt record was dropped"
    );
}

#[test]
fn dynamic_attribute_token_is_removed_from_version_2() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    seed_store(
        &path,
        Some(2),
        &[(DAT_KEY, encoded(DAT_KEY, &"eyJhbGciOiJSUzI1NiJ9".to_string()))],
    );

    let settings = activate(&path);
    assert_eq!(settings.migration_report().steps_applied, 2);
    drop(settings);

    assert!(raw_settings(&path).iter().all(|(key, _)| key != DAT_KEY));
}

#[test]
fn legacy_daps_url_is_rewritten_from_version_3() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    let legacy = custom_config(LEGACY_DAPS_URL);
    seed_store(
        &path,
        Some(3),
        &[(CONNECTOR_SETTINGS_KEY, encoded(CONNECTOR_SETTINGS_KEY, &legacy))],
    );

    let settings = activate(&path);
    assert_eq!(settings.migration_report().steps_applied, 1);
    let migrated = settings.connector_config().unwrap();
    assert_eq!(migrated.daps_url, DAPS_URL);
    assert_eq!(
        migrated,
        ConnectorConfig {
            daps_url: DAPS_URL.to_string(),
            ..legacy
        }
    );
}

#[test]
fn store_at_current_version_is_untouched() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    seed_store(
        &path,
        Some(CURRENT_DB_VERSION),
        &[
            (CONNECTOR_SETTINGS_KEY, encoded(CONNECTOR_SETTINGS_KEY, &custom_config(LEGACY_DAPS_URL))),
            (DAT_KEY, encoded(DAT_KEY, &"still here".to_string())),
        ],
    );
    let before = raw_settings(&path);

    let settings = activate(&path);
    assert_eq!(settings.migration_report().steps_applied, 0);
    drop(settings);

    assert_eq!(raw_settings(&path), before);
}

#[test]
fn future_version_is_used_as_is() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    seed_store(
        &path,
        Some(CURRENT_DB_VERSION + 1),
        &[(DAT_KEY, encoded(DAT_KEY, &"from the future".to_string()))],
    );
    let before = raw_settings(&path);

    let settings = activate(&path);
    let report = settings.migration_report();
    assert!(report.future_version);
    assert_eq!(report.steps_applied, 0);
    assert_eq!(report.to_version, CURRENT_DB_VERSION + 1);
    drop(settings);

    assert_eq!(raw_settings(&path), before);
}

#[test]
fn corrupt_profile_after_version_1_reaches_the_caller() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    seed_store(&path, Some(2), &[(CONNECTOR_PROFILE_KEY, vec![0xde, 0xad])]);

    let settings = activate(&path);
    match settings.connector_profile() {
        Err(ApiError::StorageError(err)) => assert!(err.is_corrupt_record()),
        other => panic!("expected corrupt record, got {:?}", other),
    }
}

#[test]
fn failed_step_aborts_activation_and_keeps_version() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    seed_store(&path, Some(3), &[(CONNECTOR_SETTINGS_KEY, vec![0x00])]);

    match retry_while_locked(|| SledSettings::activate(&path)) {
        Err(ApiError::StorageError(StorageError::Migration { from, .. })) => assert_eq!(from, 3),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("activation should fail"),
    }

    let version = raw_settings(&path)
        .into_iter()
        .find(|(key, _)| key == DB_VERSION_KEY)
        .unwrap();
    assert_eq!(version.1, encoded(DB_VERSION_KEY, &3u32));
}
