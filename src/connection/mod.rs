//! Connection state threaded through request handling.
//!
//! - `context`: per-worker named connection settings and open handles
//! - `connector`: turns settings into handles (`deadpool-libsql` or a dry-run recorder)

pub mod connector;
pub mod context;

#[cfg(feature = "libsql")]
pub use connector::LibsqlConnector;
pub use connector::{ConnectionHandle, Connector, NoopConnector, Target};
pub use context::ConnectionContext;
