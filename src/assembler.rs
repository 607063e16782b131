//! Joining geometry and properties into features.
//!
//! Geometry availability is authoritative for line/polygon requests: a
//! geometry row with no matching property row still produces a feature with
//! empty properties. For point requests the clean property rows drive the
//! output, since their coordinate column is the only geometry source.

use crate::error::GeoShapesError;
use crate::geojson::{Feature, Geometry};
use crate::request::EntityKind;
use crate::sanitizer::CleanPropertyRow;
use crate::spatial::store::GeometryRow;

/// Merge geometry rows and clean property rows by entity id.
///
/// Ordering follows the driving row sequence (geometry rows, or clean rows
/// for points); no additional sort is applied.
pub fn assemble(
    kind: EntityKind,
    geometry_rows: Vec<GeometryRow>,
    clean_rows: Option<Vec<CleanPropertyRow>>,
) -> Result<Vec<Feature>, GeoShapesError> {
    let clean_rows = clean_rows.unwrap_or_default();

    if kind.is_point() {
        return Ok(assemble_points(clean_rows));
    }

    let mut features = Vec::with_capacity(geometry_rows.len());
    for row in geometry_rows {
        let geometry: Geometry =
            serde_json::from_str(&row.data).map_err(|source| GeoShapesError::InvalidGeometry {
                id: row.id.clone(),
                source,
            })?;
        // First id match wins; sanitization input was keyed by id, so at
        // most one match is expected.
        let properties = clean_rows
            .iter()
            .find(|clean| clean.id.as_str() == row.id)
            .map(|clean| clean.properties.clone())
            .unwrap_or_default();
        features.push(Feature::new(row.id, geometry, properties));
    }
    Ok(features)
}

fn assemble_points(clean_rows: Vec<CleanPropertyRow>) -> Vec<Feature> {
    let mut features = Vec::with_capacity(clean_rows.len());
    for row in clean_rows {
        let Some(coordinates) = row.coordinate else {
            log::debug!("Skipping {}: no coordinate available", row.id);
            continue;
        };
        features.push(Feature::new(
            row.id.as_str(),
            Geometry::Point { coordinates },
            row.properties,
        ));
    }
    features
}
