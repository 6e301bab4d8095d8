//! Configuration records persisted by the settings store.

use serde::{Deserialize, Serialize};

/// Identity-provider URL shipped by early releases.
pub const LEGACY_DAPS_URL: &str = "https://daps.aisec.fraunhofer.de";

/// Identity-provider URL for the v2 token endpoint.
pub const DAPS_URL: &str = "https://daps.aisec.fraunhofer.de/v2";

/// Connector configuration: service endpoints and credential file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub appstore_url: String,
    pub broker_url: String,
    pub ttp_host: String,
    pub ttp_port: u16,
    pub acme_server_webcon: String,
    pub acme_dns_webcon: String,
    pub acme_port_webcon: u16,
    pub tos_accept_webcon: bool,
    /// Identity provider (DAPS) base URL
    pub daps_url: String,
    pub keystore_name: String,
    pub keystore_password: String,
    pub keystore_alias_name: String,
    pub truststore_name: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            appstore_url:
                "https://raw.githubusercontent.com/industrial-data-space/templates/master/templates.json"
                    .to_string(),
            broker_url: String::new(),
            ttp_host: "127.0.0.1".to_string(),
            ttp_port: 8080,
            acme_server_webcon: String::new(),
            acme_dns_webcon: String::new(),
            acme_port_webcon: 80,
            tos_accept_webcon: false,
            daps_url: DAPS_URL.to_string(),
            keystore_name: "provider-keystore.p12".to_string(),
            keystore_password: "password".to_string(),
            keystore_alias_name: "1".to_string(),
            truststore_name: "truststore.p12".to_string(),
        }
    }
}

/// Security profile a connector claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SecurityProfile {
    #[default]
    Base,
    Trust,
    TrustPlus,
}

/// A name with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub value: String,
    pub language: Option<String>,
}

/// Connector profile: the node's self-description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectorProfile {
    pub security_profile: SecurityProfile,
    pub connector_url: Option<String>,
    pub maintainer_url: Option<String>,
    pub connector_entity_names: Vec<LocalizedName>,
}

/// Security requirements negotiated for a single connection.
///
/// Each attribute is a level string; `"1"` is the baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub integrity_protection_and_verification: String,
    pub authentication: String,
    pub service_isolation: String,
    pub integrity_protection_verification_scope: String,
    pub app_execution_resources: String,
    pub data_usage_control_support: String,
    pub audit_logging: String,
    pub local_data_confidentiality: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        let baseline = || "1".to_string();
        Self {
            integrity_protection_and_verification: baseline(),
            authentication: baseline(),
            service_isolation: baseline(),
            integrity_protection_verification_scope: baseline(),
            app_execution_resources: baseline(),
            data_usage_control_support: baseline(),
            audit_logging: baseline(),
            local_data_confidentiality: baseline(),
        }
    }
}
