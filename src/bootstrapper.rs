//! Switching a connection context into and out of a tenant.
//!
//! `bootstrap` points the tenancy connection at one tenant's database and makes it the
//! default; `revert` puts the central values back. Both purge the open handle and open a
//! fresh one before returning.
//!
//! If reconnecting fails, the settings have already been rewritten and the context keeps
//! pointing at the tenant (or central) values with no open handle. Callers that abandon a
//! context mid-bootstrap must `revert` or discard it.

use tracing::info;

use crate::config::{ConnectionConfig, TenancyConfig, TenancySettings};
use crate::connection::ConnectionContext;
use crate::error::{Result, TenancyError};
use crate::key_store;
use crate::naming::{DatabaseLayout, TenantDatabaseName, file_url};
use crate::tenant::Tenant;
use crate::types::{ConnectionMode, OperationKind};

#[derive(Debug, Clone)]
pub struct TenancyBootstrapper {
    mode: ConnectionMode,
    layout: DatabaseLayout,
    settings: TenancySettings,
    connection_name: String,
    default_connection: String,
    central: ConnectionConfig,
}

impl TenancyBootstrapper {
    /// # Errors
    /// `TenancyError::Configuration` for replica, in-memory, or unresolvable settings, and
    /// for shared-schema tenancy on a local connection.
    pub fn new(config: &TenancyConfig) -> Result<Self> {
        let mode = ConnectionMode::parse(&config.connection).require_supported()?;

        if config.settings.shared_schema && mode == ConnectionMode::Local {
            return Err(TenancyError::Configuration(
                "Multi-DB Schema is only supported with a remote connection".to_string(),
            ));
        }

        Ok(Self {
            mode,
            layout: DatabaseLayout::from_url(&config.connection.url, &config.settings),
            settings: config.settings.clone(),
            connection_name: config.connection_name.clone(),
            default_connection: config.default_connection.clone(),
            central: config.connection.clone(),
        })
    }

    #[must_use]
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    #[must_use]
    pub fn connection_name(&self) -> &str {
        &self.connection_name
    }

    #[must_use]
    pub fn settings(&self) -> &TenancySettings {
        &self.settings
    }

    /// Point the tenancy connection at `tenant` and make it the default.
    ///
    /// # Errors
    /// `TenancyError::Storage` when a remote tenant's credential file is missing or corrupt
    /// (settings are left untouched), or a connector error from reconnecting.
    pub async fn bootstrap(&self, ctx: &mut ConnectionContext, tenant: &Tenant) -> Result<()> {
        let name = TenantDatabaseName::for_tenant(&self.settings, tenant);

        match self.mode {
            ConnectionMode::Remote => {
                name.checked_slug()?;
                let record = key_store::read_record(&self.layout.credential_file(&name))?;
                let config = ctx.config_mut(&self.connection_name)?;
                config.auth_token = record.token;
                config.sync_url = record.url;
                config.remote_only = true;
            }
            _ => {
                let path = self.layout.tenant_file(&name);
                let migrating = ctx.operation() == OperationKind::Migration;
                let config = ctx.config_mut(&self.connection_name)?;
                // a central `database` outranks the url when opening, so both must move
                config.database = path.display().to_string();
                if migrating {
                    config.url = file_url(&path);
                }
            }
        }

        ctx.reconnect(&self.connection_name).await?;
        ctx.set_default(self.connection_name.clone());
        info!(tenant = tenant.key(), database = %name, mode = %self.mode, "tenancy bootstrapped");
        Ok(())
    }

    /// Restore the central values of every field `bootstrap` touches.
    ///
    /// # Errors
    /// A connector error from reconnecting.
    pub async fn revert(&self, ctx: &mut ConnectionContext) -> Result<()> {
        let config = ctx.config_mut(&self.connection_name)?;
        match self.mode {
            ConnectionMode::Remote => {
                config.auth_token.clone_from(&self.central.auth_token);
                config.sync_url.clone_from(&self.central.sync_url);
                config.remote_only = self.central.remote_only;
            }
            _ => {
                config.url.clone_from(&self.central.url);
                config.database.clone_from(&self.central.database);
            }
        }

        ctx.reconnect(&self.connection_name).await?;
        ctx.set_default(self.default_connection.clone());
        info!(connection = %self.connection_name, "tenancy reverted");
        Ok(())
    }
}
