//! Running work inside tenant contexts, one tenant at a time.

use serde::Serialize;
use tracing::{info, warn};

use crate::bootstrapper::TenancyBootstrapper;
use crate::config::TenancySettings;
use crate::connection::ConnectionContext;
use crate::error::{Result, TenancyError};
use crate::naming::TenantDatabaseName;
use crate::tenant::Tenant;
use crate::types::OperationKind;

/// Outcome of the callback for one tenant.
#[derive(Debug)]
pub struct TenantOutcome<T> {
    pub tenant: String,
    pub result: Result<T>,
}

/// Per-tenant outcomes of a batch, in input order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outcomes: Vec<TenantOutcome<T>>,
}

impl<T> BatchReport<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.tenant.as_str())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &TenancyError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.tenant.as_str(), e)))
    }
}

/// Bootstrap each tenant, run `f`, and always revert afterwards.
///
/// A failure for one tenant is recorded and the loop moves on to the next. If bootstrap
/// fails, `f` is skipped for that tenant; if revert fails after a successful `f`, the
/// revert error is what gets recorded.
pub async fn run_for_tenants<T, F>(
    bootstrapper: &TenancyBootstrapper,
    ctx: &mut ConnectionContext,
    tenants: &[Tenant],
    mut f: F,
) -> BatchReport<T>
where
    F: AsyncFnMut(&mut ConnectionContext, &Tenant) -> Result<T>,
{
    let mut outcomes = Vec::with_capacity(tenants.len());

    for tenant in tenants {
        let result = match bootstrapper.bootstrap(ctx, tenant).await {
            Ok(()) => {
                let ran = f(&mut *ctx, tenant).await;
                let reverted = bootstrapper.revert(ctx).await;
                match (ran, reverted) {
                    (Ok(value), Ok(())) => Ok(value),
                    (Err(err), _) | (Ok(_), Err(err)) => Err(err),
                }
            }
            Err(err) => {
                // bootstrap may have rewritten settings before failing to reconnect
                if let Err(revert_err) = bootstrapper.revert(ctx).await {
                    warn!(tenant = tenant.key(), error = %revert_err, "revert after failed bootstrap failed");
                }
                Err(err)
            }
        };

        match &result {
            Ok(_) => info!(tenant = tenant.key(), "tenant run finished"),
            Err(err) => warn!(tenant = tenant.key(), error = %err, "tenant run failed"),
        }
        outcomes.push(TenantOutcome {
            tenant: tenant.key().to_string(),
            result,
        });
    }

    BatchReport { outcomes }
}

/// Tenant-scoped maintenance commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantCommand {
    Migrate,
    MigrateFresh,
    Rollback,
    Seed,
    List,
}

impl TenantCommand {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Migrate => "tenants:migrate",
            Self::MigrateFresh => "tenants:migrate-fresh",
            Self::Rollback => "tenants:rollback",
            Self::Seed => "tenants:seed",
            Self::List => "tenants:list",
        }
    }

    /// Commands during which the driver resolves the database from the connection URL.
    #[must_use]
    pub fn is_migration(self) -> bool {
        matches!(self, Self::Migrate | Self::MigrateFresh)
    }

    #[must_use]
    pub fn operation(self) -> OperationKind {
        if self.is_migration() {
            OperationKind::Migration
        } else {
            OperationKind::Query
        }
    }

    /// Schema-changing commands cannot run against shared-schema tenancy.
    ///
    /// # Errors
    /// `TenancyError::Configuration` for migrate, migrate-fresh, rollback, and seed when
    /// shared-schema mode is on.
    pub fn ensure_supported(self, settings: &TenancySettings) -> Result<()> {
        if settings.shared_schema && self != Self::List {
            return Err(TenancyError::Configuration(format!(
                "{} is not supported for Multi-DB Schemas",
                self.name()
            )));
        }
        Ok(())
    }
}

/// One row of `tenants list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantListing {
    pub id: String,
    pub database: String,
    pub domain: Option<String>,
}

impl TenantListing {
    #[must_use]
    pub fn for_tenant(settings: &TenancySettings, tenant: &Tenant) -> Self {
        Self {
            id: tenant.key().to_string(),
            database: TenantDatabaseName::for_tenant(settings, tenant).to_string(),
            domain: tenant.domain().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_schema_blocks_schema_commands() {
        let shared = TenancySettings::default().with_shared_schema(true);
        for command in [
            TenantCommand::Migrate,
            TenantCommand::MigrateFresh,
            TenantCommand::Rollback,
            TenantCommand::Seed,
        ] {
            let err = command.ensure_supported(&shared).unwrap_err();
            assert!(err.to_string().contains("Multi-DB Schemas"));
        }
        assert!(TenantCommand::List.ensure_supported(&shared).is_ok());
        assert!(TenantCommand::Seed.ensure_supported(&TenancySettings::default()).is_ok());
    }

    #[test]
    fn migrations_use_the_url_path() {
        assert_eq!(TenantCommand::Migrate.operation(), OperationKind::Migration);
        assert_eq!(TenantCommand::MigrateFresh.operation(), OperationKind::Migration);
        assert_eq!(TenantCommand::Seed.operation(), OperationKind::Query);
    }

    #[test]
    fn listing_uses_database_naming() {
        let settings = TenancySettings::default().with_suffix(".sqlite");
        let row = TenantListing::for_tenant(&settings, &Tenant::new("9").with_domain("nine.test"));
        assert_eq!(row.database, "tenant9.sqlite");
        assert_eq!(row.domain.as_deref(), Some("nine.test"));
    }
}
