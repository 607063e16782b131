//! Graph query execution and result parsing.
//!
//! Resolves the set of entity ids (explicit and/or query-derived) together
//! with any graph-supplied properties. For point requests without an explicit
//! query, a default query is synthesized that selects each entity's
//! coordinate literal over the configured coordinate predicate.

pub mod client;
pub mod value;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::GeoShapesConfig;
use crate::entity_id::EntityId;
use crate::error::GeoShapesError;
use crate::request::ShapesRequest;

use client::GraphQueryClient;
use value::{parse_coordinate_literal, BindingRow, GraphValue, RawPropertyRow};

/// Default id column in graph query results.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Column carrying the coordinate literal in graph query results.
pub const COORDINATE_COLUMN: &str = "geo";

pub struct GraphQueryRunner {
    client: Arc<dyn GraphQueryClient>,
    config: Arc<GeoShapesConfig>,
}

impl GraphQueryRunner {
    pub fn new(client: Arc<dyn GraphQueryClient>, config: Arc<GeoShapesConfig>) -> Self {
        Self { client, config }
    }

    /// Resolve property rows for the request.
    ///
    /// Returns an empty row set, not an error, when there is neither an
    /// explicit query nor a default to synthesize.
    pub async fn resolve(
        &self,
        request: &ShapesRequest,
        client_ip: &str,
    ) -> Result<Vec<RawPropertyRow>, GeoShapesError> {
        let query = match &request.query {
            Some(query) => query.clone(),
            None if request.kind.is_point() && !request.ids.is_empty() => {
                self.default_point_query(&request.ids)
            }
            None => {
                log::debug!("No graph query for {} request, skipping", request.kind.as_str());
                return Ok(Vec::new());
            }
        };

        let body = self.client.select(&query, client_ip).await?;
        let rows = parse_bindings(&body, request.id_column.as_deref())?;
        log::debug!("Graph query returned {} rows", rows.len());
        Ok(rows)
    }

    /// Synthesize the default point query: select the id and its coordinate
    /// literal for exactly the explicit id set.
    fn default_point_query(&self, ids: &[EntityId]) -> String {
        let values = ids
            .iter()
            .map(|id| format!("wd:{id}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "SELECT ?id ?geo WHERE {{ VALUES ?id {{ {values} }} . ?id {} ?geo . }}",
            self.config.coordinate_predicate
        )
    }
}

/// Parse a SPARQL JSON results body into property rows.
///
/// Duplicate ids are preserved; they are resolved later by sanitization
/// identity, not deduplicated here.
fn parse_bindings(
    body: &Value,
    id_column_override: Option<&str>,
) -> Result<Vec<RawPropertyRow>, GeoShapesError> {
    let bindings = body
        .get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(Value::as_array)
        .ok_or(GeoShapesError::MalformedGraphResponse)?;

    let user_supplied = id_column_override.is_some();
    let id_column = id_column_override.unwrap_or(DEFAULT_ID_COLUMN);

    let mut rows = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let columns = binding
            .as_object()
            .ok_or(GeoShapesError::MalformedGraphResponse)?;
        let row = BindingRow::new(columns);

        let id_value = row.require(id_column, user_supplied)?;
        let id = match GraphValue::from_binding(id_value) {
            Some(GraphValue::Uri(uri)) => EntityId::from_uri(&uri)?,
            _ => return Err(GeoShapesError::missing_id_column(id_column, user_supplied)),
        };

        let mut coordinate = None;
        let mut carried: BTreeMap<String, GraphValue> = BTreeMap::new();
        for (name, value) in row.iter() {
            if name == id_column {
                continue;
            }
            let Some(graph_value) = GraphValue::from_binding(value) else {
                continue;
            };
            if name == COORDINATE_COLUMN {
                if let GraphValue::Literal { value: literal, .. } = &graph_value {
                    if let Some(position) = parse_coordinate_literal(literal) {
                        coordinate = Some(position);
                        continue;
                    }
                }
            }
            carried.insert(name.clone(), graph_value);
        }

        rows.push(RawPropertyRow {
            id,
            coordinate,
            columns: carried,
        });
    }
    Ok(rows)
}
