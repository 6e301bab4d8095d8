use crate::support::{activate, db_path, retry_while_locked};
use connector_settings::keys::{CONNECTION_SETTINGS_MAP, GENERAL_CONFIG};
use connector_settings::migration::CURRENT_DB_VERSION;
use connector_settings::store::Store;
use connector_settings::types::{ConnectionSettings, ConnectorConfig, SecurityProfile};
use connector_settings::{ApiError, Settings, SledSettings, StorageError};
use tempfile::TempDir;

#[test]
fn activation_creates_store_with_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    assert!(!path.parent().unwrap().exists());

    let settings = activate(&path);
    assert!(path.exists());
    assert!(settings.is_active());
    assert_eq!(settings.migration_report().to_version, CURRENT_DB_VERSION);
    settings.deactivate().unwrap();
}

#[test]
fn settings_survive_restart_without_further_migration() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    let config = ConnectorConfig {
        broker_url: "https://broker.example".to_string(),
        tos_accept_webcon: true,
        ..ConnectorConfig::default()
    };

    {
        let settings = activate(&path);
        settings.set_connector_config(&config).unwrap();
        let mut profile = settings.connector_profile().unwrap();
        profile.security_profile = SecurityProfile::TrustPlus;
        settings.set_connector_profile(&profile).unwrap();
        settings.set_connector_json_ld(Some("{\"@type\":\"ids:BaseConnector\"}")).unwrap();
        settings.save_user("admin", "$2a$12$abc").unwrap();
        settings.store_contract("route-7", "<contract/>").unwrap();
        settings.deactivate().unwrap();
    }

    let settings = activate(&path);
    assert_eq!(settings.migration_report().steps_applied, 0);
    assert_eq!(settings.connector_config().unwrap(), config);
    assert_eq!(
        settings.connector_profile().unwrap().security_profile,
        SecurityProfile::TrustPlus
    );
    assert_eq!(
        settings.connector_json_ld().unwrap().as_deref(),
        Some("{\"@type\":\"ids:BaseConnector\"}")
    );
    assert_eq!(settings.user_hash("admin").unwrap().as_deref(), Some("$2a$12$abc"));
    assert_eq!(settings.load_contract("route-7").unwrap().as_deref(), Some("<contract/>"));
}

#[test]
fn cleared_json_ld_stays_absent_after_restart() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    {
        let settings = activate(&path);
        settings.set_connector_json_ld(Some("{}")).unwrap();
        settings.set_connector_json_ld(None).unwrap();
    }

    let settings = activate(&path);
    assert_eq!(settings.connector_json_ld().unwrap(), None);
}

#[test]
fn resolved_connection_is_persisted() {
    let temp = TempDir::new().unwrap();
    let path = db_path(&temp);
    let general = ConnectionSettings {
        service_isolation: "2".to_string(),
        ..ConnectionSettings::default()
    };
    {
        let settings = activate(&path);
        settings.set_connection_settings(GENERAL_CONFIG, &general).unwrap();
        let expected = settings.connection_settings(GENERAL_CONFIG).unwrap();
        assert_eq!(settings.connection_settings("ids://peer:29292").unwrap(), expected);
    }

    let store = retry_while_locked(|| Store::open(&path)).unwrap();
    let stored = store
        .map::<ConnectionSettings>(CONNECTION_SETTINGS_MAP)
        .unwrap()
        .get("ids://peer:29292")
        .unwrap();
    assert_eq!(stored, Some(general));
    store.close().unwrap();
}

#[test]
fn user_removal_and_listing() {
    let temp = TempDir::new().unwrap();
    let settings = SledSettings::activate(db_path(&temp)).unwrap();
    settings.save_user("alice", "hash-a").unwrap();
    settings.save_user("bob", "hash-b").unwrap();

    let users = settings.users().unwrap();
    assert_eq!(users.get("alice").map(String::as_str), Some("hash-a"));
    assert_eq!(users.get("bob").map(String::as_str), Some("hash-b"));

    settings.remove_user("alice").unwrap();
    assert_eq!(settings.user_hash("alice").unwrap(), None);
    assert_eq!(settings.users().unwrap().len(), 1);
}

#[test]
fn every_operation_fails_after_deactivation() {
    let temp = TempDir::new().unwrap();
    let settings = SledSettings::activate(db_path(&temp)).unwrap();
    settings.deactivate().unwrap();

    let closed = |result: Result<(), ApiError>| {
        matches!(result, Err(ApiError::StorageError(StorageError::Closed)))
    };
    assert!(closed(settings.connector_config().map(|_| ())));
    assert!(closed(settings.set_connector_json_ld(None)));
    assert!(closed(settings.connection_settings("ids://peer").map(|_| ())));
    assert!(closed(settings.save_user("admin", "hash")));
    assert!(closed(settings.store_contract("c", "doc")));
}
