use serde::{Deserialize, Serialize};

/// A tenant as seen by the connection layer: a stable key and, optionally,
/// an explicit database name that overrides the prefix/suffix convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
}

impl Tenant {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            database: None,
            domain: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

impl From<&str> for Tenant {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Tenant {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
