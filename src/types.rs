use serde::Serialize;

use crate::config::ConnectionConfig;
use crate::error::{Result, TenancyError};

pub const FILE_SCHEME: &str = "file:";
pub const MEMORY_MARKER: &str = ":memory:";

/// How tenant databases are reached, decided once from the raw connection settings.
///
/// ```rust
/// use libsql_tenancy::types::{ConnectionMode, resolve};
///
/// assert_eq!(resolve("file:db.sqlite", "", "", false), ConnectionMode::Local);
/// assert_eq!(
///     resolve("file:db.sqlite", "libsql://db.turso.io", "token", true),
///     ConnectionMode::Remote
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// One database file per tenant on local disk
    Local,
    /// Databases live on the platform; only credentials are kept locally
    Remote,
    /// Local file synced with a remote database (unsupported)
    RemoteReplica,
    /// In-process ephemeral database (unsupported)
    Memory,
    /// None of the recognised shapes matched
    Unresolved,
}

impl ConnectionMode {
    /// Normalise and resolve a connection definition.
    #[must_use]
    pub fn parse(config: &ConnectionConfig) -> Self {
        let path = normalize_url(&config.url);
        resolve(
            path,
            &config.sync_url,
            &config.auth_token,
            config.remote_only,
        )
    }

    /// Reject the modes tenancy cannot run with.
    ///
    /// # Errors
    /// Returns `TenancyError::Configuration` for replica, memory, and unresolved modes.
    pub fn require_supported(self) -> Result<Self> {
        match self {
            Self::Local | Self::Remote => Ok(self),
            Self::RemoteReplica => Err(TenancyError::Configuration(
                "Embedded Replica Connection is not supported".to_string(),
            )),
            Self::Memory => Err(TenancyError::Configuration(
                "In Memory Connection is not supported for Tenancy".to_string(),
            )),
            Self::Unresolved => Err(TenancyError::Configuration(
                "Unable to determine the libsql connection mode from url/syncUrl/authToken/remoteOnly"
                    .to_string(),
            )),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::RemoteReplica => "remote_replica",
            Self::Memory => "memory",
            Self::Unresolved => "unresolved",
        }
    }
}

impl std::fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered mode decision; the first matching rule wins.
#[must_use]
pub fn resolve(path: &str, sync_url: &str, token: &str, remote_only: bool) -> ConnectionMode {
    let file_backed = path.starts_with(FILE_SCHEME);
    let has_credentials = !sync_url.is_empty() && !token.is_empty();

    if file_backed && has_credentials && !remote_only {
        ConnectionMode::RemoteReplica
    } else if file_backed && has_credentials && remote_only {
        ConnectionMode::Remote
    } else if file_backed {
        ConnectionMode::Local
    } else if path == MEMORY_MARKER {
        ConnectionMode::Memory
    } else {
        ConnectionMode::Unresolved
    }
}

/// `file::memory:` names the in-memory database, not a file called `:memory:`.
#[must_use]
pub fn normalize_url(url: &str) -> &str {
    if url.contains(MEMORY_MARKER) {
        url.strip_prefix(FILE_SCHEME).unwrap_or(url)
    } else {
        url
    }
}

/// What the current worker is doing with its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationKind {
    /// Regular request/query traffic
    #[default]
    Query,
    /// A migration runner; the driver reads the connection URL instead of `database`
    Migration,
}
