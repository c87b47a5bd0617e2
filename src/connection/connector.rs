use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

#[cfg(feature = "libsql")]
use deadpool_libsql::{Manager, Pool};

use crate::config::ConnectionConfig;
use crate::error::Result;
#[cfg(feature = "libsql")]
use crate::error::TenancyError;
use crate::naming::strip_file_scheme;

/// An open logical connection.
#[derive(Clone)]
pub enum ConnectionHandle {
    /// `LibSQL` connection pool
    #[cfg(feature = "libsql")]
    Libsql(Pool),
    /// No driver behind it; carries the settings it was opened with
    Detached(ConnectionConfig),
}

// deadpool's Pool Debug output is noisy and the config variant must not print tokens
impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "libsql")]
            Self::Libsql(_) => f.debug_tuple("Libsql").field(&"<Pool>").finish(),
            Self::Detached(config) => f.debug_tuple("Detached").field(config).finish(),
        }
    }
}

/// Opens connection handles from connection settings.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, name: &str, config: &ConnectionConfig) -> Result<ConnectionHandle>;
}

/// Where a libsql driver should point for the given settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Remote { url: String, auth_token: String },
    Local { path: String },
}

impl Target {
    /// `remote_only` with a sync URL goes to the platform; otherwise the `database` field
    /// wins over the URL path, matching how the query path and migration path address the
    /// same file.
    #[must_use]
    pub fn of(config: &ConnectionConfig) -> Self {
        if config.remote_only && !config.sync_url.is_empty() {
            Self::Remote {
                url: config.sync_url.clone(),
                auth_token: config.auth_token.clone(),
            }
        } else if !config.database.is_empty() {
            Self::Local {
                path: config.database.clone(),
            }
        } else {
            Self::Local {
                path: strip_file_scheme(&config.url).to_string(),
            }
        }
    }
}

/// Builds `deadpool-libsql` pools.
#[cfg(feature = "libsql")]
#[derive(Debug, Clone, Default)]
pub struct LibsqlConnector;

#[cfg(feature = "libsql")]
#[async_trait]
impl Connector for LibsqlConnector {
    async fn connect(&self, name: &str, config: &ConnectionConfig) -> Result<ConnectionHandle> {
        let builder_result = match Target::of(config) {
            Target::Remote { url, auth_token } => {
                deadpool_libsql::libsql::Builder::new_remote(url, auth_token)
                    .build()
                    .await
            }
            Target::Local { path } => {
                deadpool_libsql::libsql::Builder::new_local(path)
                    .build()
                    .await
            }
        };
        let db = builder_result.map_err(|e| {
            TenancyError::Connection(format!("Failed to create libsql database for {name}: {e}"))
        })?;

        let manager = Manager::from_libsql_database(db);
        let pool = Pool::builder(manager).build().map_err(|e| {
            TenancyError::Connection(format!("Failed to create libsql pool for {name}: {e}"))
        })?;

        // Smoke-test a connection
        let _conn = pool.get().await.map_err(|e| {
            TenancyError::Connection(format!("Failed to get libsql connection for {name}: {e}"))
        })?;

        Ok(ConnectionHandle::Libsql(pool))
    }
}

/// Opens detached handles and remembers every request. Used for dry runs.
#[derive(Debug, Default)]
pub struct NoopConnector {
    opened: Mutex<Vec<(String, ConnectionConfig)>>,
}

impl NoopConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(name, config)` pair passed to `connect`, oldest first.
    #[must_use]
    pub fn opened(&self) -> Vec<(String, ConnectionConfig)> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Connector for NoopConnector {
    async fn connect(&self, name: &str, config: &ConnectionConfig) -> Result<ConnectionHandle> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), config.clone()));
        Ok(ConnectionHandle::Detached(config.clone()))
    }
}
