//! The request pipeline.
//!
//! Composes the stages linearly with one concurrent fan-out: after the graph
//! query resolves the id set, the sanitization call and the spatial lookup
//! run concurrently and join fail-fast. Everything is created per request
//! and dropped with the response; there is no cross-request state, no retry,
//! and no partial document.

use std::sync::Arc;

use serde::Serialize;

use crate::assembler::assemble;
use crate::config::GeoShapesConfig;
use crate::entity_id::EntityId;
use crate::error::GeoShapesError;
use crate::geojson::{Feature, FeatureCollection};
use crate::graph_query::client::GraphQueryClient;
use crate::graph_query::GraphQueryRunner;
use crate::request::{normalize, EntityKind, RawShapesParams};
use crate::sanitizer::client::SanitizeClient;
use crate::sanitizer::PropertySanitizer;
use crate::spatial::store::SpatialStore;
use crate::spatial::SpatialQueryRunner;
use crate::topology::{self, Topology};

/// The externally consumed response body: a flat feature collection or a
/// delta-encoded topology.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResultDocument {
    Flat(FeatureCollection),
    Topology(Topology),
}

/// Wrap the assembled features in the requested output format.
pub fn encode_result(features: Vec<Feature>, flat: bool) -> ResultDocument {
    let collection = FeatureCollection::new(features);
    if flat {
        ResultDocument::Flat(collection)
    } else {
        ResultDocument::Topology(topology::encode(&collection))
    }
}

pub struct ShapesPipeline {
    config: Arc<GeoShapesConfig>,
    graph: GraphQueryRunner,
    sanitizer: PropertySanitizer,
    spatial: SpatialQueryRunner,
}

impl ShapesPipeline {
    pub fn new(
        config: GeoShapesConfig,
        graph_client: Arc<dyn GraphQueryClient>,
        sanitize_client: Arc<dyn SanitizeClient>,
        store: Arc<dyn SpatialStore>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            graph: GraphQueryRunner::new(graph_client, config.clone()),
            sanitizer: PropertySanitizer::new(sanitize_client),
            spatial: SpatialQueryRunner::new(store, config.clone()),
            config,
        }
    }

    /// Process one request end to end.
    pub async fn run(
        &self,
        kind: EntityKind,
        params: RawShapesParams,
        client_ip: &str,
    ) -> Result<ResultDocument, GeoShapesError> {
        let request = normalize(kind, params, &self.config)?;
        log::debug!(
            "Processing {} request: {} explicit ids, query={}",
            request.kind.as_str(),
            request.ids.len(),
            request.query.is_some()
        );

        let rows = self.graph.resolve(&request, client_ip).await?;

        // Union of explicit and graph-resolved ids, first occurrence order.
        let mut ids: Vec<EntityId> = request.ids.clone();
        for row in &rows {
            if !ids.contains(&row.id) {
                ids.push(row.id.clone());
            }
        }

        // Fail-fast join: the first error aborts the request and the other
        // branch's result is dropped.
        let (clean_rows, geometry_rows) = tokio::try_join!(
            self.sanitizer.clean(&rows),
            self.spatial.query(&request, &ids),
        )?;

        let features = assemble(request.kind, geometry_rows, clean_rows)?;
        log::info!(
            "Assembled {} features for {} request",
            features.len(),
            request.kind.as_str()
        );
        Ok(encode_result(features, request.flat))
    }
}
