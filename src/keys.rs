//! Map names and reserved keys.

/// Generic settings map holding mixed value types.
pub const SETTINGS_MAP: &str = "settings_store";
/// Per-connection settings map.
pub const CONNECTION_SETTINGS_MAP: &str = "connection_settings";
/// Username to password hash.
pub const USER_MAP: &str = "user_store";
/// Contract key to contract document.
pub const CONTRACT_MAP: &str = "contract_store";

pub const DB_VERSION_KEY: &str = "db_version";
pub const CONNECTOR_SETTINGS_KEY: &str = "main_config";
pub const CONNECTOR_PROFILE_KEY: &str = "connector_profile";
pub const CONNECTOR_JSON_LD_KEY: &str = "connector_json_ld";
/// Retired by the v2 to v3 migration.
pub const DAT_KEY: &str = "dynamic_attribute_token";

/// Connection name of the fallback entry for connections without their own settings.
pub const GENERAL_CONFIG: &str = "General Configuration";

/// Store location relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "etc/settings.sled";
