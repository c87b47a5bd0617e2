//! Configuration consumed by the manager and bootstrapper.
//!
//! Values come from the process environment (optionally seeded from a `.env` file),
//! or from any key lookup function in tests:
//! ```rust
//! use libsql_tenancy::config::TenancyConfig;
//!
//! let config = TenancyConfig::from_lookup(|key| match key {
//!     "DB_URL" => Some("file:/srv/app/database/central.sqlite".to_string()),
//!     "TENANCY_DB_SUFFIX" => Some(".sqlite".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//! assert_eq!(config.settings.suffix, ".sqlite");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TenancyError};

pub const DEFAULT_CONNECTION_NAME: &str = "libsql";
pub const DEFAULT_DATABASE_URL: &str = "file:database/database.sqlite";
pub const DEFAULT_DATABASE_PATH: &str = "database";
pub const DEFAULT_TENANT_PREFIX: &str = "tenant";
pub const DEFAULT_GROUP: &str = "default";
pub const DEFAULT_API_URL: &str = "https://api.turso.tech";

/// A single named libsql connection definition.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub url: String,
    pub sync_url: String,
    pub auth_token: String,
    pub remote_only: bool,
    pub database: String,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sync_url(mut self, sync_url: impl Into<String>) -> Self {
        self.sync_url = sync_url.into();
        self
    }

    #[must_use]
    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = auth_token.into();
        self
    }

    #[must_use]
    pub fn with_remote_only(mut self, remote_only: bool) -> Self {
        self.remote_only = remote_only;
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Copy with the auth token blanked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.auth_token.is_empty() {
            copy.auth_token = "<redacted>".to_string();
        }
        copy
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("sync_url", &self.sync_url)
            .field("auth_token", &redact(&self.auth_token))
            .field("remote_only", &self.remote_only)
            .field("database", &self.database)
            .finish()
    }
}

/// Tenancy-level naming and mode switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenancySettings {
    pub prefix: String,
    pub suffix: String,
    /// Shared-schema tenancy instead of one database per tenant.
    pub shared_schema: bool,
    /// Directory used when the connection URL is a bare filename.
    pub database_path: PathBuf,
}

impl Default for TenancySettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_TENANT_PREFIX.to_string(),
            suffix: String::new(),
            shared_schema: false,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl TenancySettings {
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_shared_schema(mut self, shared_schema: bool) -> Self {
        self.shared_schema = shared_schema;
        self
    }

    #[must_use]
    pub fn with_database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_path = path.as_ref().to_path_buf();
        self
    }
}

/// Database platform account settings.
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformSettings {
    pub primary_database: String,
    pub organization: String,
    pub api_token: String,
    pub default_group: String,
    pub api_url: String,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            primary_database: String::new(),
            organization: String::new(),
            api_token: String::new(),
            default_group: DEFAULT_GROUP.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for PlatformSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformSettings")
            .field("primary_database", &self.primary_database)
            .field("organization", &self.organization)
            .field("api_token", &redact(&self.api_token))
            .field("default_group", &self.default_group)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Everything the tenancy components read at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenancyConfig {
    /// Logical name of the connection the bootstrapper rewrites.
    pub connection_name: String,
    /// Connection made default again on revert.
    pub default_connection: String,
    pub connection: ConnectionConfig,
    pub settings: TenancySettings,
    pub platform: PlatformSettings,
}

impl TenancyConfig {
    #[must_use]
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection_name: DEFAULT_CONNECTION_NAME.to_string(),
            default_connection: DEFAULT_CONNECTION_NAME.to_string(),
            connection,
            settings: TenancySettings::default(),
            platform: PlatformSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: TenancySettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: PlatformSettings) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn with_default_connection(mut self, name: impl Into<String>) -> Self {
        self.default_connection = name.into();
        self
    }

    /// Load from the process environment, reading `.env` first when one exists.
    ///
    /// # Errors
    /// Returns `TenancyError::Configuration` for malformed boolean values.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a specific `.env` file, then the process environment.
    ///
    /// # Errors
    /// Returns `TenancyError::Configuration` if the file cannot be read or a value is malformed.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::from_path(path.as_ref()).map_err(|e| {
            TenancyError::Configuration(format!(
                "Failed to load {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns `TenancyError::Configuration` for malformed boolean values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str| -> Result<bool> {
            match lookup(key) {
                Some(raw) => parse_bool(key, &raw),
                None => Ok(false),
            }
        };

        let connection = ConnectionConfig {
            url: string("DB_URL", DEFAULT_DATABASE_URL),
            sync_url: string("DB_SYNC_URL", ""),
            auth_token: string("DB_AUTH_TOKEN", ""),
            remote_only: flag("DB_REMOTE_ONLY")?,
            database: string("DB_DATABASE", ""),
        };

        let settings = TenancySettings {
            prefix: string("TENANCY_DB_PREFIX", DEFAULT_TENANT_PREFIX),
            suffix: string("TENANCY_DB_SUFFIX", ""),
            shared_schema: flag("TURSO_MULTIDB_SCHEMA")?,
            database_path: PathBuf::from(string("DB_DATABASE_PATH", DEFAULT_DATABASE_PATH)),
        };

        let platform = PlatformSettings {
            primary_database: string("TURSO_DB_PRIMARY_NAME", ""),
            organization: string("TURSO_DB_PRIMARY_ORG", ""),
            api_token: string("TURSO_API_TOKEN", ""),
            default_group: string("TURSO_DB_DEFAULT_GROUP", DEFAULT_GROUP),
            api_url: string("TURSO_API_URL", DEFAULT_API_URL),
        };

        Ok(Self {
            connection_name: DEFAULT_CONNECTION_NAME.to_string(),
            default_connection: string("DB_CONNECTION", DEFAULT_CONNECTION_NAME),
            connection,
            settings,
            platform,
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" | "(false)" => Ok(false),
        "1" | "true" | "yes" | "on" | "(true)" => Ok(true),
        other => Err(TenancyError::Configuration(format!(
            "{key} must be a boolean, got {other:?}"
        ))),
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "<redacted>" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = TenancyConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.connection.url, DEFAULT_DATABASE_URL);
        assert!(!config.connection.remote_only);
        assert_eq!(config.settings.prefix, "tenant");
        assert_eq!(config.platform.default_group, "default");
        assert_eq!(config.default_connection, "libsql");
    }

    #[test]
    fn reads_remote_values() {
        let config = TenancyConfig::from_lookup(lookup(&[
            ("DB_URL", "file:/srv/db/central.sqlite"),
            ("DB_SYNC_URL", "libsql://central-acme.turso.io"),
            ("DB_AUTH_TOKEN", "secret"),
            ("DB_REMOTE_ONLY", "true"),
            ("TURSO_DB_PRIMARY_ORG", "acme"),
            ("TURSO_MULTIDB_SCHEMA", "0"),
        ]))
        .unwrap();
        assert!(config.connection.remote_only);
        assert_eq!(config.connection.auth_token, "secret");
        assert_eq!(config.platform.organization, "acme");
        assert!(!config.settings.shared_schema);
    }

    #[test]
    fn rejects_malformed_flags() {
        let err = TenancyConfig::from_lookup(lookup(&[("DB_REMOTE_ONLY", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("DB_REMOTE_ONLY"));
    }

    #[test]
    fn debug_output_hides_tokens() {
        let conn = ConnectionConfig::new("file:x.db").with_auth_token("super-secret");
        assert!(!format!("{conn:?}").contains("super-secret"));
        assert_eq!(conn.redacted().auth_token, "<redacted>");
    }
}
