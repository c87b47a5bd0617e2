use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::{DEFAULT_API_URL, PlatformSettings};
use crate::error::PlatformError;

use super::DatabasePlatform;
use super::types::{
    CreateDatabaseBody, CreateDatabaseResponse, CreateTokenResponse, CreatedDatabase, ErrorBody,
    TokenOptions,
};

/// HTTP client for the database platform API.
///
/// Every request carries `Authorization: Bearer <api token>`; only HTTP 200 counts as success.
#[derive(Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl PlatformClient {
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_API_URL.to_string(),
            api_token: api_token.into(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &PlatformSettings) -> Self {
        Self::new(settings.api_token.clone()).with_base_url(settings.api_url.clone())
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Impose a per-request deadline. None is configured by default.
    ///
    /// # Errors
    /// Returns `PlatformError::Transport` if the HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, PlatformError> {
        self.http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn databases_url(&self, organization: &str) -> String {
        format!("{}/v1/organizations/{organization}/databases", self.base_url)
    }

    fn database_url(&self, organization: &str, name: &str) -> String {
        format!("{}/{name}", self.databases_url(organization))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, PlatformError> {
        let response = request.bearer_auth(&self.api_token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(status = status.as_u16(), %message, "platform API call failed");
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| PlatformError::Decode(e.to_string()))
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        debug!(%method, url, "platform API request");
        self.http.request(method, url)
    }
}

#[async_trait]
impl DatabasePlatform for PlatformClient {
    async fn create_database(
        &self,
        organization: &str,
        name: &str,
        group: &str,
    ) -> Result<CreatedDatabase, PlatformError> {
        let request = self
            .request(Method::POST, &self.databases_url(organization))
            .json(&CreateDatabaseBody { name, group });
        let response: CreateDatabaseResponse = self.call(request).await?;
        Ok(response.database)
    }

    async fn create_token(
        &self,
        organization: &str,
        name: &str,
        options: &TokenOptions,
    ) -> Result<String, PlatformError> {
        let url = format!("{}/auth/tokens", self.database_url(organization, name));
        let request = self.request(Method::POST, &url).query(&[
            ("expiration", options.expiration.as_str()),
            ("authorization", options.authorization.as_str()),
        ]);
        let response: CreateTokenResponse = self.call(request).await?;
        Ok(response.jwt)
    }

    async fn delete_database(&self, organization: &str, name: &str) -> Result<(), PlatformError> {
        let request = self.request(Method::DELETE, &self.database_url(organization, name));
        self.send(request).await?;
        Ok(())
    }

    async fn database_info(
        &self,
        organization: &str,
        name: &str,
    ) -> Result<JsonValue, PlatformError> {
        let request = self.request(Method::GET, &self.database_url(organization, name));
        let body: JsonValue = self.call(request).await?;
        Ok(match body {
            JsonValue::Object(mut map) => match map.remove("database") {
                Some(database) => database,
                None => JsonValue::Object(map),
            },
            other => other,
        })
    }
}
