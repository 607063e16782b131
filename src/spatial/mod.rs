//! Parameterized geometry lookup.
//!
//! Selects a table by entity kind and a SQL template by profile name, binds
//! the validated id union plus tunable template parameters, and executes
//! against the spatial store. Request-supplied parameter values are accepted
//! only when they match the strict numeric-literal grammar, so user input
//! can tune query behaviour (e.g. simplification tolerance) but can never
//! alter the SQL text.

pub mod store;
pub mod templates;

use std::sync::Arc;

use crate::config::GeoShapesConfig;
use crate::entity_id::EntityId;
use crate::error::GeoShapesError;
use crate::request::{EntityKind, ShapesRequest};

use store::{GeometryRow, SpatialStore};
use templates::{baseline, is_numeric_literal, SqlTemplate};

pub struct SpatialQueryRunner {
    store: Arc<dyn SpatialStore>,
    config: Arc<GeoShapesConfig>,
}

impl SpatialQueryRunner {
    pub fn new(store: Arc<dyn SpatialStore>, config: Arc<GeoShapesConfig>) -> Self {
        Self { store, config }
    }

    /// Fetch geometry rows for the id union.
    ///
    /// Point requests and empty id sets short-circuit to an empty result:
    /// point geometry comes entirely from the graph query's coordinate
    /// column, never from the spatial store.
    pub async fn query(
        &self,
        request: &ShapesRequest,
        ids: &[EntityId],
    ) -> Result<Vec<GeometryRow>, GeoShapesError> {
        if request.kind.is_point() || ids.is_empty() {
            return Ok(Vec::new());
        }

        let table = self.table_for(request.kind)?;
        let template = self.template_for(&request.sql_profile);
        let params = resolve_params(template, request)?;
        log::debug!(
            "Spatial lookup: profile={} table={} ids={}",
            request.sql_profile,
            table,
            ids.len()
        );

        let id_strings: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.store
            .query(&template.sql, table, &id_strings, &params)
            .await
    }

    fn table_for(&self, kind: EntityKind) -> Result<&str, GeoShapesError> {
        match kind {
            EntityKind::Line => Ok(&self.config.line_table),
            EntityKind::Polygon => Ok(&self.config.polygon_table),
            EntityKind::Point => Err(GeoShapesError::UnknownTable(kind.as_str().to_string())),
        }
    }

    /// Unknown profiles fall back to the baseline template rather than
    /// failing: the profile name tunes behaviour, it does not gate access.
    fn template_for(&self, profile: &str) -> &SqlTemplate {
        self.config
            .queries
            .get(profile)
            .or_else(|| self.config.queries.get(templates::BASELINE_PROFILE))
            .unwrap_or_else(|| baseline())
    }
}

/// Resolve the template's declared parameters against request-supplied
/// values. A supplied value matching the numeric-literal grammar is used;
/// a supplied value that does not match fails with `InvalidParam`; an absent
/// value falls back to the template default.
fn resolve_params(
    template: &SqlTemplate,
    request: &ShapesRequest,
) -> Result<Vec<String>, GeoShapesError> {
    let mut resolved = Vec::with_capacity(template.params.len());
    for param in &template.params {
        match request.args.get(&param.name) {
            Some(value) if is_numeric_literal(value) => resolved.push(value.clone()),
            Some(value) => {
                return Err(GeoShapesError::InvalidParam {
                    name: param.name.clone(),
                    value: value.clone(),
                })
            }
            None => resolved.push(param.default.clone()),
        }
    }
    Ok(resolved)
}
