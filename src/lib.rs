//! GeoShapes - geometry document assembly for geographic entities
//!
//! This crate turns a request identifying geographic entities (an explicit
//! id list and/or a federated graph query) into a single validated
//! geometry-bearing document through:
//! - Request validation against a strict entity-id grammar
//! - SPARQL execution and result parsing
//! - Externally-delegated property sanitization
//! - Parameterized geometry lookup in a PostGIS-style store
//! - GeoJSON or delta-encoded topology output

pub mod assembler;
pub mod config;
pub mod entity_id;
pub mod error;
pub mod geojson;
pub mod graph_query;
pub mod pipeline;
pub mod request;
pub mod sanitizer;
pub mod spatial;
pub mod topology;

pub use config::{ConfigError, GeoShapesConfig};
pub use entity_id::EntityId;
pub use error::GeoShapesError;
pub use pipeline::{encode_result, ResultDocument, ShapesPipeline};
pub use request::{EntityKind, RawShapesParams, ShapesRequest};
