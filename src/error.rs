//! Error types for the shape pipeline.
//!
//! Every variant is terminal for the request it occurs in: nothing is retried
//! at this layer and no partial document is ever produced. Validation errors
//! (`InvalidInput`, `InvalidId`, `InvalidParam`, ...) fire before any network
//! call; transport errors from the collaborator services are wrapped with
//! enough context to diagnose without exposing query templates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoShapesError {
    #[error("missing ids or query parameter")]
    InvalidInput,

    #[error("graph query service is not enabled")]
    FeatureDisabled,

    #[error("no more than {max} ids may be requested at once (got {count})")]
    TooManyIds { count: usize, max: usize },

    #[error("invalid entity id `{0}`")]
    InvalidId(String),

    #[error("unexpected content type `{0}` from the graph query endpoint")]
    UnexpectedContentType(String),

    #[error("graph query response does not contain a results.bindings array")]
    MalformedGraphResponse,

    #[error("{0}")]
    MissingIdColumn(String),

    #[error("graph query returned unusable entity id `{0}`")]
    InvalidGraphId(String),

    #[error("property sanitization failed: {0}")]
    SanitizationError(String),

    #[error("invalid value `{value}` for query parameter `{name}`")]
    InvalidParam { name: String, value: String },

    #[error("no geometry table for entity kind `{0}`")]
    UnknownTable(String),

    #[error("invalid geometry for `{id}`: {source}")]
    InvalidGeometry {
        id: String,
        source: serde_json::Error,
    },

    #[error("graph or sanitization transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("spatial store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GeoShapesError {
    /// Build a `MissingIdColumn` error whose message tells the caller whether
    /// the column name came from the request or was the default, so they know
    /// which knob to turn.
    pub fn missing_id_column(column: &str, user_supplied: bool) -> Self {
        let message = if user_supplied {
            format!(
                "graph query result does not contain the requested id column `{column}`"
            )
        } else {
            format!(
                "graph query result does not contain the default id column `{column}`; \
                 name it with the idcolumn parameter"
            )
        };
        Self::MissingIdColumn(message)
    }
}
