//! Database platform API glue.
//!
//! - `client`: reqwest-backed [`PlatformClient`]
//! - `types`: request and response shapes
//!
//! The manager only talks to the [`DatabasePlatform`] trait, so any other
//! implementation (a fake, a recording proxy) can stand in for the HTTP client.

pub mod client;
pub mod types;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::PlatformError;

pub use client::PlatformClient;
pub use types::{CreatedDatabase, LIBSQL_SCHEME, TokenAuthorization, TokenOptions};

/// The four database lifecycle calls tenancy needs.
#[async_trait]
pub trait DatabasePlatform: Send + Sync {
    /// Create a database in `group`.
    async fn create_database(
        &self,
        organization: &str,
        name: &str,
        group: &str,
    ) -> Result<CreatedDatabase, PlatformError>;

    /// Mint an auth token for a database.
    async fn create_token(
        &self,
        organization: &str,
        name: &str,
        options: &TokenOptions,
    ) -> Result<String, PlatformError>;

    async fn delete_database(&self, organization: &str, name: &str) -> Result<(), PlatformError>;

    /// Database details as returned by the platform.
    async fn database_info(&self, organization: &str, name: &str)
    -> Result<JsonValue, PlatformError>;
}
