//! Tenant database names, slugs, and where their files live.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::TenancySettings;
use crate::error::{Result, TenancyError};
use crate::tenant::Tenant;
use crate::types::FILE_SCHEME;

/// Extension of per-tenant credential files.
pub const CREDENTIAL_EXTENSION: &str = "bin";

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9]+").expect("static regex");
}

/// Canonical lowercase, hyphen-separated form of a name.
///
/// ```rust
/// use libsql_tenancy::naming::slugify;
///
/// assert_eq!(slugify("My Tenant_01!!"), "my-tenant-01");
/// assert_eq!(slugify(&slugify("--Acme  Corp--")), "acme-corp");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let lowered = input.to_ascii_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Logical database name of one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantDatabaseName(String);

impl TenantDatabaseName {
    /// `<prefix><tenant id><suffix>`, unless the tenant carries an explicit name.
    #[must_use]
    pub fn for_tenant(settings: &TenancySettings, tenant: &Tenant) -> Self {
        match tenant.database_name() {
            Some(name) => Self(name.to_string()),
            None => Self(format!(
                "{}{}{}",
                settings.prefix,
                tenant.key(),
                settings.suffix
            )),
        }
    }

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name used for the remote database and the credential file alike.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&file_stem(&self.0))
    }

    /// The slug, refusing names with no alphanumeric characters at all.
    ///
    /// # Errors
    /// `TenancyError::Configuration` when the slug would be empty.
    pub fn checked_slug(&self) -> Result<String> {
        let slug = self.slug();
        if slug.is_empty() {
            return Err(TenancyError::Configuration(format!(
                "Database name {:?} has no usable characters",
                self.0
            )));
        }
        Ok(slug)
    }
}

impl std::fmt::Display for TenantDatabaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantDatabaseName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Directory holding tenant database files and credential files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseLayout {
    dir: PathBuf,
}

impl DatabaseLayout {
    /// A bare filename in `url` means "use the configured database directory";
    /// anything with a separator means "next to that file".
    #[must_use]
    pub fn from_url(url: &str, settings: &TenancySettings) -> Self {
        let path = strip_file_scheme(url);
        let dir = if is_path(path) {
            Path::new(path)
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        } else {
            settings.database_path.clone()
        };
        Self { dir }
    }

    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn tenant_file(&self, name: &TenantDatabaseName) -> PathBuf {
        self.dir.join(name.as_str())
    }

    #[must_use]
    pub fn credential_file(&self, name: &TenantDatabaseName) -> PathBuf {
        self.dir
            .join(format!("{}.{CREDENTIAL_EXTENSION}", name.slug()))
    }
}

/// `file:` URL for a local path.
#[must_use]
pub fn file_url(path: &Path) -> String {
    format!("{FILE_SCHEME}{}", path.display())
}

#[must_use]
pub fn strip_file_scheme(url: &str) -> &str {
    url.strip_prefix(FILE_SCHEME).unwrap_or(url)
}

fn is_path(value: &str) -> bool {
    value.contains('/') || value.contains('\\') || value.contains(std::path::MAIN_SEPARATOR)
}

fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map_or_else(|| name.to_string(), |stem| stem.to_string_lossy().into_owned())
}
