//! HTTP transport for the metadata sanitization endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::config::ConfigError;
use crate::error::GeoShapesError;
use crate::graph_query::client::build_header_map;

/// MediaWiki-style API action performing the sanitization.
pub const SANITIZE_ACTION: &str = "sanitize-mapdata";

/// Submits a JSON-encoded feature array for sanitization and returns the
/// parsed response body. Envelope validation belongs to the sanitizer.
#[async_trait]
pub trait SanitizeClient: Send + Sync {
    async fn sanitize(&self, text: &str) -> Result<serde_json::Value, GeoShapesError>;
}

/// Production client posting a form submission to the sanitization API.
pub struct HttpSanitizeClient {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
}

impl HttpSanitizeClient {
    pub fn new(
        endpoint: impl Into<String>,
        headers: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            headers: build_header_map(headers)?,
        })
    }
}

#[async_trait]
impl SanitizeClient for HttpSanitizeClient {
    async fn sanitize(&self, text: &str) -> Result<serde_json::Value, GeoShapesError> {
        log::debug!("Sanitizing {} bytes of properties", text.len());

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .form(&[
                ("action", SANITIZE_ACTION),
                ("format", "json"),
                ("text", text),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}
