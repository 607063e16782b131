//! Spatial store access.
//!
//! The store is addressed through a narrow trait so the runner can be tested
//! without a database: a template, a table identifier, the id list, and the
//! ordered template parameters go in; `{id, data}` geometry rows come out.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::GeoShapesError;

/// One geometry result row: the entity id and its serialized GeoJSON
/// geometry (`ST_AsGeoJSON` output).
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct GeometryRow {
    pub id: String,
    pub data: String,
}

#[async_trait]
pub trait SpatialStore: Send + Sync {
    /// Execute `sql` with `(table, ids, params...)` as positional arguments.
    async fn query(
        &self,
        sql: &str,
        table: &str,
        ids: &[String],
        params: &[String],
    ) -> Result<Vec<GeometryRow>, GeoShapesError>;
}

/// Postgres/PostGIS-backed store.
pub struct PostgresSpatialStore {
    pool: PgPool,
}

impl PostgresSpatialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpatialStore for PostgresSpatialStore {
    async fn query(
        &self,
        sql: &str,
        table: &str,
        ids: &[String],
        params: &[String],
    ) -> Result<Vec<GeometryRow>, GeoShapesError> {
        // Table identifiers cannot be bound; they come from configuration,
        // never from the request.
        let sql = sql.replace("{table}", table);

        let mut query = sqlx::query_as::<_, GeometryRow>(&sql).bind(ids);
        for param in params {
            query = query.bind(param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        log::debug!("Spatial store returned {} geometry rows from {table}", rows.len());
        Ok(rows)
    }
}
