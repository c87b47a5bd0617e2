//! Per-tenant libsql connection provisioning and routing.
//!
//! Tenant databases are either local files next to the central database or databases
//! hosted on the Turso platform, whose credentials are kept in small binary files.
//! [`manager::TenantDatabaseManager`] creates and deletes them;
//! [`bootstrapper::TenancyBootstrapper`] switches a [`connection::ConnectionContext`]
//! into a tenant and back.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use libsql_tenancy::prelude::*;
//!
//! # async fn demo() -> Result<(), TenancyError> {
//! let config = TenancyConfig::from_env()?;
//! let bootstrapper = TenancyBootstrapper::new(&config)?;
//! let mut ctx = ConnectionContext::from_config(&config, Arc::new(NoopConnector::new()));
//!
//! bootstrapper.bootstrap(&mut ctx, &Tenant::new("acme")).await?;
//! // ... queries against ctx.connection() hit the tenant database ...
//! bootstrapper.revert(&mut ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrapper;
pub mod config;
pub mod connection;
pub mod error;
pub mod key_store;
pub mod manager;
pub mod naming;
pub mod platform;
pub mod prelude;
pub mod runner;
pub mod tenant;
pub mod types;

pub use error::{PlatformError, Result, StorageError, TenancyError};
