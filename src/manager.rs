//! Tenant database provisioning.
//!
//! The manager creates, deletes, and inspects tenant databases. In local mode a tenant
//! database is a file next to the central database; in remote mode it is a platform
//! database whose credentials are kept in a small credential file.
//!
//! Per-tenant failures come back as `false` (or `Err` from the `try_` variants) so a
//! loop over many tenants keeps going after one of them fails.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{ConnectionConfig, PlatformSettings, TenancyConfig};
use crate::error::{ProvisioningStage, Result, StorageError, TenancyError};
use crate::key_store::{self, TenantKeyRecord};
use crate::naming::{DatabaseLayout, TenantDatabaseName, file_url};
use crate::platform::{DatabasePlatform, TokenOptions};
use crate::tenant::Tenant;
use crate::types::ConnectionMode;

pub struct TenantDatabaseManager {
    mode: ConnectionMode,
    layout: DatabaseLayout,
    config: TenancyConfig,
    platform: Arc<dyn DatabasePlatform>,
    token_options: TokenOptions,
}

impl std::fmt::Debug for TenantDatabaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantDatabaseManager")
            .field("mode", &self.mode)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl TenantDatabaseManager {
    /// Resolve the connection mode and fix it for the lifetime of the manager.
    ///
    /// # Errors
    /// Returns `TenancyError::Configuration` for replica, in-memory, or unresolvable
    /// connection settings.
    pub fn new(config: TenancyConfig, platform: Arc<dyn DatabasePlatform>) -> Result<Self> {
        let mode = ConnectionMode::parse(&config.connection).require_supported()?;
        let layout = DatabaseLayout::from_url(&config.connection.url, &config.settings);
        info!(%mode, dir = %layout.dir().display(), "tenant database manager ready");

        Ok(Self {
            mode,
            layout,
            config,
            platform,
            token_options: TokenOptions::default(),
        })
    }

    #[must_use]
    pub fn with_token_options(mut self, options: TokenOptions) -> Self {
        self.token_options = options;
        self
    }

    #[must_use]
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    #[must_use]
    pub fn layout(&self) -> &DatabaseLayout {
        &self.layout
    }

    #[must_use]
    pub fn database_name(&self, tenant: &Tenant) -> TenantDatabaseName {
        TenantDatabaseName::for_tenant(&self.config.settings, tenant)
    }

    /// Local file of a tenant database (local mode).
    #[must_use]
    pub fn tenant_path(&self, tenant: &Tenant) -> PathBuf {
        self.layout.tenant_file(&self.database_name(tenant))
    }

    /// Credential file of a tenant database (remote mode).
    #[must_use]
    pub fn credential_path(&self, tenant: &Tenant) -> PathBuf {
        self.layout.credential_file(&self.database_name(tenant))
    }

    fn platform_settings(&self) -> &PlatformSettings {
        &self.config.platform
    }

    /// Create the tenant database; `false` on any failure.
    pub async fn create_database(&self, tenant: &Tenant) -> bool {
        match self.try_create_database(tenant).await {
            Ok(()) => true,
            Err(err) => {
                warn!(tenant = tenant.key(), error = %err, "tenant database creation failed");
                false
            }
        }
    }

    /// Create the tenant database.
    ///
    /// Local mode writes an empty file, truncating an existing one. Remote mode creates the
    /// platform database, mints a token, and only then writes the credential file.
    ///
    /// # Errors
    /// `TenancyError::Platform` if the database could not be created at all;
    /// `TenancyError::PartialProvisioning` if it was created but the token or credential
    /// file step failed. The orphaned remote database is left in place.
    pub async fn try_create_database(&self, tenant: &Tenant) -> Result<()> {
        let name = self.database_name(tenant);

        if self.mode == ConnectionMode::Local {
            let path = self.layout.tenant_file(&name);
            fs::write(&path, b"").map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            info!(tenant = tenant.key(), path = %path.display(), "created tenant database file");
            return Ok(());
        }

        let slug = name.checked_slug()?;
        let settings = self.platform_settings();
        let created = self
            .platform
            .create_database(&settings.organization, &slug, &settings.default_group)
            .await?;
        info!(tenant = tenant.key(), database = %slug, hostname = %created.hostname, "created remote database");

        let token = self
            .platform
            .create_token(&settings.organization, &slug, &self.token_options)
            .await
            .map_err(|err| partial(&slug, ProvisioningStage::CreateToken, err.into()))?;

        let record = TenantKeyRecord::new(token, created.connection_url());
        let path = self.layout.credential_file(&name);
        key_store::write_record(&path, &record)
            .map_err(|err| partial(&slug, ProvisioningStage::PersistCredentials, err.into()))?;

        info!(tenant = tenant.key(), path = %path.display(), "stored tenant credentials");
        Ok(())
    }

    /// Delete the tenant database.
    ///
    /// In remote mode the result is the platform call's outcome; the credential file is
    /// removed afterwards and a failure to do so is only logged.
    pub async fn delete_database(&self, tenant: &Tenant) -> bool {
        let name = self.database_name(tenant);

        if self.mode == ConnectionMode::Local {
            let path = self.layout.tenant_file(&name);
            return match fs::remove_file(&path) {
                Ok(()) => true,
                Err(err) => {
                    warn!(tenant = tenant.key(), path = %path.display(), error = %err, "tenant database file removal failed");
                    false
                }
            };
        }

        let slug = match name.checked_slug() {
            Ok(slug) => slug,
            Err(err) => {
                warn!(tenant = tenant.key(), error = %err, "remote database deletion skipped");
                return false;
            }
        };
        let remote = self
            .platform
            .delete_database(&self.platform_settings().organization, &slug)
            .await;

        let path = self.layout.credential_file(&name);
        if let Err(err) = key_store::remove(&path) {
            warn!(tenant = tenant.key(), error = %err, "credential file removal failed");
        }

        match remote {
            Ok(()) => {
                info!(tenant = tenant.key(), database = %slug, "deleted remote database");
                true
            }
            Err(err) => {
                warn!(tenant = tenant.key(), database = %slug, error = %err, "remote database deletion failed");
                false
            }
        }
    }

    /// Whether a tenant database exists. A failed remote lookup reads as `false`.
    pub async fn database_exists(&self, name: &str) -> bool {
        let name = TenantDatabaseName::new(name);

        if self.mode == ConnectionMode::Local {
            return self.layout.tenant_file(&name).exists();
        }

        let Ok(slug) = name.checked_slug() else {
            return false;
        };
        match self
            .platform
            .database_info(&self.platform_settings().organization, &slug)
            .await
        {
            Ok(_) => true,
            Err(err) => {
                debug!(database = %slug, error = %err, "database lookup failed");
                false
            }
        }
    }

    /// Connection settings for one tenant database, derived from `base`.
    ///
    /// Nothing on disk or on the platform is changed.
    ///
    /// # Errors
    /// `TenancyError::Storage` if the tenant's credential file is missing or unreadable.
    pub fn make_connection_config(
        &self,
        base: &ConnectionConfig,
        database_name: &str,
    ) -> Result<ConnectionConfig> {
        let name = TenantDatabaseName::new(database_name);
        let mut config = base.clone();

        if self.mode == ConnectionMode::Remote {
            let record = key_store::read_record(&self.layout.credential_file(&name))?;
            config.auth_token = record.token;
            config.sync_url = record.url;
        } else {
            config.url = file_url(&self.layout.tenant_file(&name));
        }

        Ok(config)
    }
}

fn partial(database: &str, stage: ProvisioningStage, source: TenancyError) -> TenancyError {
    error!(
        database,
        %stage,
        error = %source,
        "remote database created but provisioning did not finish; database is orphaned"
    );
    TenancyError::PartialProvisioning {
        database: database.to_string(),
        stage,
        source: Box::new(source),
    }
}
