//! End-to-end pipeline tests against mocked collaborator services.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};

use geoshapes::error::GeoShapesError;
use geoshapes::graph_query::client::GraphQueryClient;
use geoshapes::request::{EntityKind, RawShapesParams};
use geoshapes::sanitizer::client::SanitizeClient;
use geoshapes::spatial::store::{GeometryRow, SpatialStore};
use geoshapes::{GeoShapesConfig, ShapesPipeline};

mock! {
    pub Graph {}

    #[async_trait]
    impl GraphQueryClient for Graph {
        async fn select(&self, query: &str, client_ip: &str) -> Result<Value, GeoShapesError>;
    }
}

mock! {
    pub Sanitize {}

    #[async_trait]
    impl SanitizeClient for Sanitize {
        async fn sanitize(&self, text: &str) -> Result<Value, GeoShapesError>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl SpatialStore for Store {
        async fn query(
            &self,
            sql: &str,
            table: &str,
            ids: &[String],
            params: &[String],
        ) -> Result<Vec<GeometryRow>, GeoShapesError>;
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pipeline(graph: MockGraph, sanitize: MockSanitize, store: MockStore) -> ShapesPipeline {
    ShapesPipeline::new(
        GeoShapesConfig::default(),
        Arc::new(graph),
        Arc::new(sanitize),
        Arc::new(store),
    )
}

fn uri_binding(id: &str) -> Value {
    json!({"type": "uri", "value": format!("http://www.wikidata.org/entity/{id}")})
}

fn sparql_body(bindings: Value) -> Value {
    json!({"results": {"bindings": bindings}})
}

fn sanitized_body(features: Value) -> Value {
    json!({"sanitize-mapdata": {"sanitized": features.to_string()}})
}

fn polygon_row(id: &str) -> GeometryRow {
    GeometryRow {
        id: id.to_string(),
        data: r#"{"type":"Polygon","coordinates":[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,0.0]]]}"#
            .to_string(),
    }
}

#[tokio::test]
async fn polygon_request_merges_properties_and_geometry() {
    init_logging();

    let mut graph = MockGraph::new();
    graph.expect_select().times(1).returning(|_, _| {
        Ok(sparql_body(json!([{
            "id": uri_binding("Q1"),
            "title": {"type": "literal", "value": "One"}
        }])))
    });

    let mut sanitize = MockSanitize::new();
    sanitize.expect_sanitize().times(1).returning(|_| {
        Ok(sanitized_body(
            json!([{"id": "Q1", "properties": {"title": "One"}}]),
        ))
    });

    let mut store = MockStore::new();
    store
        .expect_query()
        .times(1)
        .withf(|_, table, ids, _| {
            table == "planet_osm_polygon" && ids.len() == 2 && ids[0] == "Q1" && ids[1] == "Q2"
        })
        .returning(|_, _, _, _| Ok(vec![polygon_row("Q1"), polygon_row("Q2")]));

    let params = RawShapesParams {
        ids: Some("Q1,Q2".to_string()),
        query: Some("SELECT ?id ?title WHERE { ... }".to_string()),
        flat: true,
        ..Default::default()
    };

    let document = pipeline(graph, sanitize, store)
        .run(EntityKind::Polygon, params, "127.0.0.1")
        .await
        .unwrap();

    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["type"], "FeatureCollection");
    let features = value["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["id"], "Q1");
    assert_eq!(features[0]["properties"], json!({"title": "One"}));
    // Geometry availability is authoritative: Q2 has no property row.
    assert_eq!(features[1]["id"], "Q2");
    assert_eq!(features[1]["properties"], json!({}));
}

#[tokio::test]
async fn point_request_takes_geometry_from_the_graph_query() {
    init_logging();

    let mut graph = MockGraph::new();
    graph
        .expect_select()
        .times(1)
        .withf(|query, _| query.contains("VALUES ?id { wd:Q1 }"))
        .returning(|_, _| {
            Ok(sparql_body(json!([{
                "id": uri_binding("Q1"),
                "geo": {"type": "literal", "value": "Point(12.5 41.9)"},
                "name": {"type": "literal", "value": "Rome"}
            }])))
        });

    let mut sanitize = MockSanitize::new();
    sanitize.expect_sanitize().times(1).returning(|_| {
        Ok(sanitized_body(
            json!([{"id": "Q1", "properties": {"name": "Rome"}}]),
        ))
    });

    // No expectation on the store: a point request must never reach it.
    let store = MockStore::new();

    let params = RawShapesParams {
        ids: Some("Q1".to_string()),
        flat: true,
        ..Default::default()
    };

    let document = pipeline(graph, sanitize, store)
        .run(EntityKind::Point, params, "127.0.0.1")
        .await
        .unwrap();

    let value = serde_json::to_value(&document).unwrap();
    let features = value["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["geometry"]["type"], "Point");
    assert_eq!(features[0]["geometry"]["coordinates"], json!([12.5, 41.9]));
    assert_eq!(features[0]["properties"], json!({"name": "Rome"}));
}

#[tokio::test]
async fn default_output_is_a_topology_document() {
    let mut graph = MockGraph::new();
    graph.expect_select().returning(|_, _| {
        Ok(sparql_body(json!([{
            "id": uri_binding("Q1"),
            "geo": {"type": "literal", "value": "Point(1 2)"}
        }])))
    });
    let mut sanitize = MockSanitize::new();
    sanitize
        .expect_sanitize()
        .returning(|_| Ok(sanitized_body(json!([{"id": "Q1", "properties": {}}]))));
    let store = MockStore::new();

    let params = RawShapesParams {
        ids: Some("Q1".to_string()),
        flat: false,
        ..Default::default()
    };

    let document = pipeline(graph, sanitize, store)
        .run(EntityKind::Point, params, "127.0.0.1")
        .await
        .unwrap();

    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["type"], "Topology");
    assert_eq!(
        value["objects"]["data"]["geometries"][0]["coordinates"],
        json!([1.0, 2.0])
    );
}

#[tokio::test]
async fn sanitization_failure_fails_the_whole_request() {
    let mut graph = MockGraph::new();
    graph.expect_select().returning(|_, _| {
        Ok(sparql_body(json!([{
            "id": uri_binding("Q1"),
            "title": {"type": "literal", "value": "One"}
        }])))
    });

    let mut sanitize = MockSanitize::new();
    sanitize
        .expect_sanitize()
        .returning(|_| Err(GeoShapesError::SanitizationError("service down".to_string())));

    // The spatial branch may succeed; its result must be discarded.
    let mut store = MockStore::new();
    store
        .expect_query()
        .returning(|_, _, _, _| Ok(vec![polygon_row("Q1")]));

    let params = RawShapesParams {
        ids: Some("Q1".to_string()),
        query: Some("SELECT ?id ?title WHERE { ... }".to_string()),
        ..Default::default()
    };

    let err = pipeline(graph, sanitize, store)
        .run(EntityKind::Polygon, params, "127.0.0.1")
        .await
        .unwrap_err();

    assert!(matches!(err, GeoShapesError::SanitizationError(_)));
}

#[tokio::test]
async fn spatial_failure_fails_the_whole_request() {
    let mut graph = MockGraph::new();
    graph.expect_select().returning(|_, _| {
        Ok(sparql_body(json!([{
            "id": uri_binding("Q1"),
            "title": {"type": "literal", "value": "One"}
        }])))
    });

    let mut sanitize = MockSanitize::new();
    sanitize.expect_sanitize().returning(|_| {
        Ok(sanitized_body(
            json!([{"id": "Q1", "properties": {"title": "One"}}]),
        ))
    });

    let mut store = MockStore::new();
    store
        .expect_query()
        .returning(|_, _, _, _| Err(GeoShapesError::UnknownTable("boom".to_string())));

    let params = RawShapesParams {
        ids: Some("Q1".to_string()),
        query: Some("SELECT ?id ?title WHERE { ... }".to_string()),
        ..Default::default()
    };

    let err = pipeline(graph, sanitize, store)
        .run(EntityKind::Polygon, params, "127.0.0.1")
        .await
        .unwrap_err();

    assert!(matches!(err, GeoShapesError::UnknownTable(_)));
}

#[tokio::test]
async fn validation_failures_never_reach_a_collaborator() {
    // No expectations on any mock: a validation error must fail fast with
    // no side effects.
    let config = GeoShapesConfig {
        max_ids: 2,
        ..Default::default()
    };
    let pipeline = ShapesPipeline::new(
        config,
        Arc::new(MockGraph::new()),
        Arc::new(MockSanitize::new()),
        Arc::new(MockStore::new()),
    );

    let params = RawShapesParams {
        ids: Some("Q1,Q2,Q3".to_string()),
        ..Default::default()
    };
    let err = pipeline
        .run(EntityKind::Polygon, params, "127.0.0.1")
        .await
        .unwrap_err();
    assert!(matches!(err, GeoShapesError::TooManyIds { .. }));

    let err = pipeline
        .run(EntityKind::Polygon, RawShapesParams::default(), "127.0.0.1")
        .await
        .unwrap_err();
    assert!(matches!(err, GeoShapesError::InvalidInput));
}

#[tokio::test]
async fn graph_query_without_endpoint_is_feature_disabled() {
    let config = GeoShapesConfig {
        graph_endpoint: None,
        ..Default::default()
    };
    let pipeline = ShapesPipeline::new(
        config,
        Arc::new(MockGraph::new()),
        Arc::new(MockSanitize::new()),
        Arc::new(MockStore::new()),
    );

    let params = RawShapesParams {
        query: Some("SELECT ?id WHERE {}".to_string()),
        ..Default::default()
    };

    let err = pipeline
        .run(EntityKind::Point, params, "127.0.0.1")
        .await
        .unwrap_err();
    assert!(matches!(err, GeoShapesError::FeatureDisabled));
}
