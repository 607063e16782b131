//! Externally-delegated property sanitization.
//!
//! Free-form property values from the graph query are not trusted in output
//! until they have passed through the sanitization service. The service
//! consumes GeoJSON, so each raw row is wrapped in a placeholder feature with
//! a zero/zero point geometry — geometry is irrelevant here, only the
//! properties matter.

pub mod client;
pub mod simplestyle;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::entity_id::EntityId;
use crate::error::GeoShapesError;
use crate::geojson::Position;
use crate::graph_query::value::RawPropertyRow;

use client::{SanitizeClient, SANITIZE_ACTION};

/// A property row whose values have been externally cleaned.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanPropertyRow {
    pub id: EntityId,
    pub coordinate: Option<Position>,
    pub properties: Map<String, Value>,
}

/// Sanitized payload item: `{id, properties}`.
#[derive(Debug, Deserialize)]
struct SanitizedFeature {
    #[serde(default)]
    properties: Map<String, Value>,
}

pub struct PropertySanitizer {
    client: Arc<dyn SanitizeClient>,
}

impl PropertySanitizer {
    pub fn new(client: Arc<dyn SanitizeClient>) -> Self {
        Self { client }
    }

    /// Clean the given rows, or return `None` when there is nothing to clean.
    ///
    /// `None` means "no properties available" and is not an error; the
    /// assembler treats it the same as an empty row set.
    pub async fn clean(
        &self,
        rows: &[RawPropertyRow],
    ) -> Result<Option<Vec<CleanPropertyRow>>, GeoShapesError> {
        if rows.is_empty() {
            return Ok(None);
        }

        let placeholders: Vec<Value> = rows.iter().map(placeholder_feature).collect();
        let text = serde_json::to_string(&placeholders)?;
        let body = self.client.sanitize(&text).await?;
        let sanitized = extract_sanitized(&body)?;

        if sanitized.len() != rows.len() {
            return Err(GeoShapesError::SanitizationError(format!(
                "sanitizer returned {} features for {} rows",
                sanitized.len(),
                rows.len()
            )));
        }

        let clean = rows
            .iter()
            .zip(sanitized)
            .map(|(row, feature)| CleanPropertyRow {
                id: row.id.clone(),
                coordinate: row.coordinate,
                properties: feature.properties,
            })
            .collect();
        Ok(Some(clean))
    }
}

/// Build the placeholder feature for one raw row: canonical property keys,
/// normalized values, and a throwaway point geometry.
fn placeholder_feature(row: &RawPropertyRow) -> Value {
    let mut properties = Map::new();
    for (name, value) in &row.columns {
        if let Some(normalized) = value.normalized() {
            properties.insert(simplestyle::canonical_key(name).to_string(), normalized);
        }
    }
    json!({
        "type": "Feature",
        "id": row.id.as_str(),
        "properties": properties,
        "geometry": {"type": "Point", "coordinates": [0, 0]}
    })
}

/// Validate the response envelope and parse the sanitized feature array.
fn extract_sanitized(body: &Value) -> Result<Vec<SanitizedFeature>, GeoShapesError> {
    if let Some(error) = body.get("error") {
        return Err(GeoShapesError::SanitizationError(error.to_string()));
    }
    let envelope = body
        .get(SANITIZE_ACTION)
        .ok_or_else(|| GeoShapesError::SanitizationError("missing result envelope".to_string()))?;
    if let Some(error) = envelope.get("error") {
        return Err(GeoShapesError::SanitizationError(error.to_string()));
    }
    let payload = envelope
        .get("sanitized")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            GeoShapesError::SanitizationError("sanitized payload is absent".to_string())
        })?;
    serde_json::from_str(payload).map_err(|e| {
        GeoShapesError::SanitizationError(format!("sanitized payload is not an array: {e}"))
    })
}
