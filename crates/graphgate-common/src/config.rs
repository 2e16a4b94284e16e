//! Configuration types for the graphgate gateway
//!
//! Every section has defaults so a partial (or missing) TOML file is valid.

use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener configuration
    pub http: HttpConfig,
    /// Account directory service
    pub accounts: AccountsConfig,
    /// Storage gateway service
    pub storage: StorageConfig,
    /// Identity lookup configuration
    pub identity: IdentityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Listen address
    pub listen: String,
    /// Path prefix the Graph routes are served under (empty or `/` = none)
    pub root: String,
    /// Upper bound on the processing time of a single request
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9120".to_string(),
            root: "/graph/v1.0".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Account directory service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// gRPC endpoint
    pub endpoint: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9180".to_string(),
        }
    }
}

/// Storage gateway service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// gRPC endpoint
    pub endpoint: String,
    /// Metadata key carrying the caller's access token on outgoing calls
    pub token_header: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9142".to_string(),
            token_header: "x-access-token".to_string(),
        }
    }
}

/// Directory filters used to map token claims to an account.
///
/// Placeholders: `{mail}`, `{iss}`, `{sub}`. Substituted values are
/// quote-escaped before insertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Filter used when the claims carry an email address
    pub email_query: String,
    /// Filter used otherwise
    pub subject_query: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            email_query: "mail eq '{mail}'".to_string(),
            subject_query:
                "identities/any(id:id/issuer eq '{iss}' and id/issuerAssignedId eq '{sub}')"
                    .to_string(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
