#![allow(dead_code)]

use std::path::Path;

use libsql_tenancy::prelude::*;

pub const ORG: &str = "acme";
pub const API_TOKEN: &str = "api-token";
pub const CENTRAL_SYNC_URL: &str = "libsql://central-acme.turso.io";
pub const CENTRAL_TOKEN: &str = "central-token";

pub fn central_url(dir: &Path) -> String {
    format!("file:{}", dir.join("central.sqlite").display())
}

pub fn local_config(dir: &Path) -> TenancyConfig {
    TenancyConfig::new(ConnectionConfig::new(central_url(dir)))
        .with_settings(TenancySettings::default().with_suffix(".sqlite"))
}

pub fn remote_config(dir: &Path, api_url: &str) -> TenancyConfig {
    let connection = ConnectionConfig::new(central_url(dir))
        .with_sync_url(CENTRAL_SYNC_URL)
        .with_auth_token(CENTRAL_TOKEN)
        .with_remote_only(true);
    let platform = PlatformSettings {
        organization: ORG.to_string(),
        api_token: API_TOKEN.to_string(),
        api_url: api_url.to_string(),
        ..PlatformSettings::default()
    };
    TenancyConfig::new(connection)
        .with_settings(TenancySettings::default().with_suffix(".sqlite"))
        .with_platform(platform)
}
