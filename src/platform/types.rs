use serde::{Deserialize, Serialize};

/// URL scheme of platform-hosted databases.
pub const LIBSQL_SCHEME: &str = "libsql://";

/// Database returned by a successful create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDatabase {
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "DbId", default)]
    pub db_id: String,
}

impl CreatedDatabase {
    /// `libsql://<hostname>`; the scheme is fixed by the platform.
    #[must_use]
    pub fn connection_url(&self) -> String {
        format!("{LIBSQL_SCHEME}{}", self.hostname)
    }
}

/// Options for database auth tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOptions {
    pub expiration: String,
    pub authorization: TokenAuthorization,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            expiration: "never".to_string(),
            authorization: TokenAuthorization::FullAccess,
        }
    }
}

impl TokenOptions {
    #[must_use]
    pub fn with_expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = expiration.into();
        self
    }

    #[must_use]
    pub fn with_authorization(mut self, authorization: TokenAuthorization) -> Self {
        self.authorization = authorization;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAuthorization {
    FullAccess,
    ReadOnly,
}

impl TokenAuthorization {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullAccess => "full-access",
            Self::ReadOnly => "read-only",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateDatabaseBody<'a> {
    pub(crate) name: &'a str,
    pub(crate) group: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateDatabaseResponse {
    pub(crate) database: CreatedDatabase,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateTokenResponse {
    pub(crate) jwt: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: Option<String>,
}
