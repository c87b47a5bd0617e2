use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = TenancyError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TenancyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The remote database exists but nothing local references it.
    #[error("Partial provisioning of {database}: database created but {stage} failed: {source}")]
    PartialProvisioning {
        database: String,
        stage: ProvisioningStage,
        #[source]
        source: Box<TenancyError>,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    /// Failure reported by per-tenant work, such as a migration or seeder callback.
    #[error("Tenant error: {0}")]
    Tenant(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TenancyError {
    /// True for failures reaching the platform API at all, as opposed to an API answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Platform(err) => err.is_transport(),
            Self::PartialProvisioning { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

/// Step of remote provisioning that ran after the database itself was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStage {
    CreateToken,
    PersistCredentials,
}

impl std::fmt::Display for ProvisioningStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateToken => f.write_str("token creation"),
            Self::PersistCredentials => f.write_str("credential persistence"),
        }
    }
}

/// Credential file failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Credential file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(
        "Credential file {} is corrupt: declared {declared} bytes, {available} available",
        path.display()
    )]
    Corrupt {
        path: PathBuf,
        declared: u64,
        available: u64,
    },

    #[error("Credential payload of {0} bytes does not fit a 4-byte length prefix")]
    TooLarge(usize),

    #[error("Credential file {} is unreadable: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential file {} does not hold a token/url record: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures talking to the database platform API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// DNS, TLS, connect, or body read failures. Candidates for a caller-side retry.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Platform API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected platform response: {0}")]
    Decode(String),
}

impl PlatformError {
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status for API-level failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}
