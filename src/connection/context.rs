use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::{ConnectionConfig, TenancyConfig};
use crate::error::{Result, TenancyError};
use crate::types::OperationKind;

use super::connector::{ConnectionHandle, Connector};

/// Connection state of one worker: named connection settings, the default name,
/// and whatever handles are currently open.
///
/// A context is owned by one worker (or request) at a time; mutation needs `&mut`.
/// Two workers serving different tenants need two contexts.
pub struct ConnectionContext {
    connections: HashMap<String, ConnectionConfig>,
    handles: HashMap<String, ConnectionHandle>,
    default: String,
    operation: OperationKind,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("connections", &self.connections)
            .field("open", &self.handles.keys().collect::<Vec<_>>())
            .field("default", &self.default)
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

impl ConnectionContext {
    #[must_use]
    pub fn new(default: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        Self {
            connections: HashMap::new(),
            handles: HashMap::new(),
            default: default.into(),
            operation: OperationKind::default(),
            connector,
        }
    }

    /// Context holding the tenancy connection, with the configured default selected.
    #[must_use]
    pub fn from_config(config: &TenancyConfig, connector: Arc<dyn Connector>) -> Self {
        Self::new(config.default_connection.clone(), connector)
            .with_connection(config.connection_name.clone(), config.connection.clone())
    }

    #[must_use]
    pub fn with_connection(mut self, name: impl Into<String>, config: ConnectionConfig) -> Self {
        self.connections.insert(name.into(), config);
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: OperationKind) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn set_operation(&mut self, operation: OperationKind) {
        self.operation = operation;
    }

    #[must_use]
    pub fn config(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.get(name)
    }

    /// Mutable settings of a named connection.
    ///
    /// Changing them does not affect an already open handle; purge and reconnect for that.
    ///
    /// # Errors
    /// `TenancyError::Configuration` if no such connection is defined.
    pub fn config_mut(&mut self, name: &str) -> Result<&mut ConnectionConfig> {
        self.connections
            .get_mut(name)
            .ok_or_else(|| unknown_connection(name))
    }

    #[must_use]
    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default = name.into();
    }

    #[must_use]
    pub fn handle(&self, name: &str) -> Option<&ConnectionHandle> {
        self.handles.get(name)
    }

    /// Drop the open handle for `name`. Returns whether one was open.
    pub fn purge(&mut self, name: &str) -> bool {
        let purged = self.handles.remove(name).is_some();
        debug!(connection = name, purged, "purged connection");
        purged
    }

    /// Open a fresh handle for `name` from its current settings.
    ///
    /// # Errors
    /// `TenancyError::Configuration` for unknown names, or whatever the connector reports.
    pub async fn reconnect(&mut self, name: &str) -> Result<&ConnectionHandle> {
        self.purge(name);
        let config = self
            .connections
            .get(name)
            .ok_or_else(|| unknown_connection(name))?;
        let handle = self.connector.connect(name, config).await?;
        debug!(connection = name, "reconnected");
        Ok(self.handles.entry(name.to_string()).or_insert(handle))
    }

    /// Handle of the default connection, opened on first use.
    ///
    /// # Errors
    /// See [`ConnectionContext::reconnect`].
    pub async fn connection(&mut self) -> Result<&ConnectionHandle> {
        let name = self.default.clone();
        if self.handles.contains_key(&name) {
            return self
                .handles
                .get(&name)
                .ok_or_else(|| unknown_connection(&name));
        }
        self.reconnect(&name).await
    }
}

fn unknown_connection(name: &str) -> TenancyError {
    TenancyError::Configuration(format!("Database connection [{name}] not configured"))
}
