//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::bootstrapper::TenancyBootstrapper;
pub use crate::config::{ConnectionConfig, PlatformSettings, TenancyConfig, TenancySettings};
pub use crate::connection::{ConnectionContext, ConnectionHandle, Connector, NoopConnector, Target};
pub use crate::error::{PlatformError, ProvisioningStage, StorageError, TenancyError};
pub use crate::key_store::TenantKeyRecord;
pub use crate::manager::TenantDatabaseManager;
pub use crate::naming::{DatabaseLayout, TenantDatabaseName, slugify};
pub use crate::platform::{DatabasePlatform, PlatformClient, TokenOptions};
pub use crate::runner::{BatchReport, TenantCommand, run_for_tenants};
pub use crate::tenant::Tenant;
pub use crate::types::{ConnectionMode, OperationKind, resolve};

#[cfg(feature = "libsql")]
pub use crate::connection::LibsqlConnector;
