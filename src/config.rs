use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::spatial::templates::{builtin_templates, SqlTemplate};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Pipeline configuration with validation.
///
/// Everything the pipeline consumes is bound here explicitly and handed to
/// each component at construction time; there is no process-wide mutable
/// state.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct GeoShapesConfig {
    /// Maximum number of distinct entity ids per request
    #[validate(range(min = 1, max = 10000, message = "Max ids must be between 1 and 10000"))]
    pub max_ids: usize,

    /// Graph query (SPARQL) endpoint URL; graph queries are disabled when unset
    pub graph_endpoint: Option<String>,

    /// Extra headers sent with every graph query request
    #[serde(default)]
    pub graph_headers: HashMap<String, String>,

    /// Metadata sanitization endpoint URL
    #[validate(length(min = 1, message = "Sanitize endpoint cannot be empty"))]
    pub sanitize_endpoint: String,

    /// Extra headers sent with every sanitization request
    #[serde(default)]
    pub sanitize_headers: HashMap<String, String>,

    /// Predicate linking an entity to its coordinate literal in the graph store
    #[validate(length(min = 1, message = "Coordinate predicate cannot be empty"))]
    pub coordinate_predicate: String,

    /// Geometry table for polygon-like entities
    #[validate(length(min = 1, message = "Polygon table cannot be empty"))]
    pub polygon_table: String,

    /// Geometry table for line-like entities
    #[validate(length(min = 1, message = "Line table cannot be empty"))]
    pub line_table: String,

    /// Named SQL profiles for the spatial store
    #[serde(default = "builtin_templates")]
    pub queries: HashMap<String, SqlTemplate>,
}

impl Default for GeoShapesConfig {
    fn default() -> Self {
        Self {
            max_ids: 500,
            graph_endpoint: Some(
                "https://query.wikidata.org/bigdata/namespace/wdq/sparql".to_string(),
            ),
            graph_headers: HashMap::new(),
            sanitize_endpoint: "https://commons.wikimedia.org/w/api.php".to_string(),
            sanitize_headers: HashMap::new(),
            coordinate_predicate: "wdt:P625".to_string(),
            polygon_table: "planet_osm_polygon".to_string(),
            line_table: "planet_osm_line".to_string(),
            queries: builtin_templates(),
        }
    }
}

impl GeoShapesConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_ids: parse_env_var("GEOSHAPES_MAX_IDS", "500")?,
            graph_endpoint: env::var("GEOSHAPES_GRAPH_ENDPOINT").ok(),
            graph_headers: HashMap::new(),
            sanitize_endpoint: env::var("GEOSHAPES_SANITIZE_ENDPOINT")
                .unwrap_or(defaults.sanitize_endpoint),
            sanitize_headers: HashMap::new(),
            coordinate_predicate: env::var("GEOSHAPES_COORDINATE_PREDICATE")
                .unwrap_or(defaults.coordinate_predicate),
            polygon_table: env::var("GEOSHAPES_POLYGON_TABLE").unwrap_or(defaults.polygon_table),
            line_table: env::var("GEOSHAPES_LINE_TABLE").unwrap_or(defaults.line_table),
            queries: builtin_templates(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Whether graph queries can be served at all
    pub fn graph_query_enabled(&self) -> bool {
        self.graph_endpoint.is_some()
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
