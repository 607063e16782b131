//! HTTP transport for the graph query endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::config::ConfigError;
use crate::error::GeoShapesError;

/// Content-type prefix identifying SPARQL JSON results.
const SPARQL_RESULTS_CONTENT_TYPE: &str = "application/sparql-results+json";

/// Executes a SPARQL select and returns the parsed JSON body.
///
/// Implementations validate the transport-level response (status and content
/// type); response *shape* validation belongs to the runner.
#[async_trait]
pub trait GraphQueryClient: Send + Sync {
    async fn select(&self, query: &str, client_ip: &str) -> Result<serde_json::Value, GeoShapesError>;
}

/// Production client for a SPARQL HTTP endpoint.
pub struct HttpGraphQueryClient {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
}

impl HttpGraphQueryClient {
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
impl GraphQueryClient for HttpGraphQueryClient {
    async fn select(
        &self,
        query: &str,
        client_ip: &str,
    ) -> Result<serde_json::Value, GeoShapesError> {
        log::debug!("Executing graph query against {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .headers(self.headers.clone())
            .header("X-Client-IP", client_ip)
            .query(&[("format", "json"), ("query", query)])
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with(SPARQL_RESULTS_CONTENT_TYPE) {
            return Err(GeoShapesError::UnexpectedContentType(content_type));
        }

        Ok(response.json().await?)
    }
}

/// Convert configured string headers into a `HeaderMap` once, at build time.
pub(crate) fn build_header_map(
    headers: &HashMap<String, String>,
) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
