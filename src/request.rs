//! Request normalization.
//!
//! Turns raw, untrusted request parameters into a validated [`ShapesRequest`]
//! before anything touches the network. All failures here are detected
//! without side effects.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::GeoShapesConfig;
use crate::entity_id::EntityId;
use crate::error::GeoShapesError;
use crate::spatial::templates::BASELINE_PROFILE;

/// The kind of geographic entity being requested.
///
/// Point geometry comes from the graph query's coordinate column; line and
/// polygon geometry comes from the spatial store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Point,
    Line,
    Polygon,
}

impl EntityKind {
    pub fn is_point(self) -> bool {
        matches!(self, Self::Point)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
        }
    }
}

/// Raw request parameters, exactly as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RawShapesParams {
    /// Comma-joined entity id list, e.g. `"Q1,Q2,Q3"`
    pub ids: Option<String>,
    /// Explicit graph query
    pub query: Option<String>,
    /// Overrides the id column name in graph query results
    pub id_column: Option<String>,
    /// Named SQL profile for the spatial lookup
    pub sql: Option<String>,
    /// Return a flat FeatureCollection instead of a topology
    pub flat: bool,
    /// Free-form parameters consumed by the selected SQL template
    pub args: HashMap<String, String>,
}

/// A validated request.
#[derive(Debug, Clone)]
pub struct ShapesRequest {
    pub kind: EntityKind,
    /// Deduplicated explicit ids, first occurrence order
    pub ids: Vec<EntityId>,
    pub query: Option<String>,
    pub id_column: Option<String>,
    pub sql_profile: String,
    pub flat: bool,
    pub args: HashMap<String, String>,
}

/// Validate raw parameters into a [`ShapesRequest`].
pub fn normalize(
    kind: EntityKind,
    params: RawShapesParams,
    config: &GeoShapesConfig,
) -> Result<ShapesRequest, GeoShapesError> {
    let has_ids = params.ids.as_deref().is_some_and(|v| !v.trim().is_empty());
    let has_query = params
        .query
        .as_deref()
        .is_some_and(|v| !v.trim().is_empty());

    if !has_ids && !has_query {
        return Err(GeoShapesError::InvalidInput);
    }
    if has_query && !config.graph_query_enabled() {
        return Err(GeoShapesError::FeatureDisabled);
    }

    let mut ids: Vec<EntityId> = Vec::new();
    if let Some(raw_ids) = params.ids.as_deref() {
        // Count against the limit before spending time on grammar checks.
        let mut seen: Vec<&str> = Vec::new();
        for token in raw_ids.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !seen.contains(&token) {
                seen.push(token);
            }
        }
        if seen.len() > config.max_ids {
            return Err(GeoShapesError::TooManyIds {
                count: seen.len(),
                max: config.max_ids,
            });
        }
        for token in seen {
            ids.push(EntityId::parse(token)?);
        }
    }

    Ok(ShapesRequest {
        kind,
        ids,
        query: if has_query { params.query } else { None },
        id_column: params.id_column,
        sql_profile: params
            .sql
            .unwrap_or_else(|| BASELINE_PROFILE.to_string()),
        flat: params.flat,
        args: params.args,
    })
}
