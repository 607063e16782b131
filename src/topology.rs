//! Topology encoding of a feature collection.
//!
//! Re-encodes a flat FeatureCollection so that every line string and ring is
//! stored once in a shared arc table, with arc coordinates delta-encoded
//! (first position absolute, subsequent positions as offsets). Identical
//! boundaries collapse to a single arc. Per-object properties are the
//! identity projection of the source feature's properties — nothing is
//! subset or renamed.
//!
//! [`decode`] reverses the transform and exists so the property-preservation
//! law can be checked in-crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geojson::{Feature, FeatureCollection, Geometry, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    pub objects: TopoObjects,
    pub arcs: Vec<Vec<Position>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoObjects {
    pub data: TopoCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometries: Vec<TopoGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoGeometry {
    #[serde(flatten)]
    pub value: TopoGeometryValue,
    pub id: String,
    pub properties: Map<String, Value>,
}

/// Geometry body of a topology object. Point families keep their
/// coordinates inline; line and polygon families reference the arc table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometryValue {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { arcs: Vec<usize> },
    MultiLineString { arcs: Vec<Vec<usize>> },
    Polygon { arcs: Vec<Vec<usize>> },
    MultiPolygon { arcs: Vec<Vec<Vec<usize>>> },
}

/// Interns coordinate sequences, collapsing exact duplicates to one arc.
#[derive(Default)]
struct ArcTable {
    arcs: Vec<Vec<Position>>,
    seen: HashMap<Vec<(u64, u64)>, usize>,
}

impl ArcTable {
    fn intern(&mut self, line: &[Position]) -> usize {
        let key: Vec<(u64, u64)> = line.iter().map(|p| (p[0].to_bits(), p[1].to_bits())).collect();
        if let Some(&index) = self.seen.get(&key) {
            return index;
        }
        let index = self.arcs.len();
        self.arcs.push(line.to_vec());
        self.seen.insert(key, index);
        index
    }

    /// Finish the table, delta-encoding every arc.
    fn into_arcs(self) -> Vec<Vec<Position>> {
        self.arcs.into_iter().map(delta_encode).collect()
    }
}

fn delta_encode(line: Vec<Position>) -> Vec<Position> {
    let mut encoded = Vec::with_capacity(line.len());
    let mut previous: Option<Position> = None;
    for position in line {
        match previous {
            None => encoded.push(position),
            Some(prev) => encoded.push([position[0] - prev[0], position[1] - prev[1]]),
        }
        previous = Some(position);
    }
    encoded
}

fn delta_decode(line: &[Position]) -> Vec<Position> {
    let mut decoded = Vec::with_capacity(line.len());
    let mut x = 0.0;
    let mut y = 0.0;
    for (i, position) in line.iter().enumerate() {
        if i == 0 {
            x = position[0];
            y = position[1];
        } else {
            x += position[0];
            y += position[1];
        }
        decoded.push([x, y]);
    }
    decoded
}

/// Encode a feature collection as a topology.
pub fn encode(collection: &FeatureCollection) -> Topology {
    let mut table = ArcTable::default();
    let geometries = collection
        .features
        .iter()
        .map(|feature| TopoGeometry {
            value: convert_geometry(&feature.geometry, &mut table),
            id: feature.id.clone(),
            // Identity projection: every property, verbatim.
            properties: feature.properties.clone(),
        })
        .collect();

    Topology {
        kind: "Topology".to_string(),
        objects: TopoObjects {
            data: TopoCollection {
                kind: "GeometryCollection".to_string(),
                geometries,
            },
        },
        arcs: table.into_arcs(),
    }
}

fn convert_geometry(geometry: &Geometry, table: &mut ArcTable) -> TopoGeometryValue {
    match geometry {
        Geometry::Point { coordinates } => TopoGeometryValue::Point {
            coordinates: *coordinates,
        },
        Geometry::MultiPoint { coordinates } => TopoGeometryValue::MultiPoint {
            coordinates: coordinates.clone(),
        },
        Geometry::LineString { coordinates } => TopoGeometryValue::LineString {
            arcs: vec![table.intern(coordinates)],
        },
        Geometry::MultiLineString { coordinates } => TopoGeometryValue::MultiLineString {
            arcs: coordinates
                .iter()
                .map(|line| vec![table.intern(line)])
                .collect(),
        },
        Geometry::Polygon { coordinates } => TopoGeometryValue::Polygon {
            arcs: coordinates
                .iter()
                .map(|ring| vec![table.intern(ring)])
                .collect(),
        },
        Geometry::MultiPolygon { coordinates } => TopoGeometryValue::MultiPolygon {
            arcs: coordinates
                .iter()
                .map(|polygon| {
                    polygon
                        .iter()
                        .map(|ring| vec![table.intern(ring)])
                        .collect()
                })
                .collect(),
        },
    }
}

/// Decode a topology back to a flat feature collection.
pub fn decode(topology: &Topology) -> FeatureCollection {
    let arcs: Vec<Vec<Position>> = topology.arcs.iter().map(|arc| delta_decode(arc)).collect();
    let features = topology
        .objects
        .data
        .geometries
        .iter()
        .map(|object| {
            Feature::new(
                object.id.clone(),
                restore_geometry(&object.value, &arcs),
                object.properties.clone(),
            )
        })
        .collect();
    FeatureCollection::new(features)
}

fn join_arcs(indexes: &[usize], arcs: &[Vec<Position>]) -> Vec<Position> {
    let mut line = Vec::new();
    for &index in indexes {
        let segment = arcs.get(index).cloned().unwrap_or_default();
        // Consecutive arcs share their boundary position.
        let skip = usize::from(!line.is_empty());
        line.extend(segment.into_iter().skip(skip));
    }
    line
}

fn restore_geometry(value: &TopoGeometryValue, arcs: &[Vec<Position>]) -> Geometry {
    match value {
        TopoGeometryValue::Point { coordinates } => Geometry::Point {
            coordinates: *coordinates,
        },
        TopoGeometryValue::MultiPoint { coordinates } => Geometry::MultiPoint {
            coordinates: coordinates.clone(),
        },
        TopoGeometryValue::LineString { arcs: indexes } => Geometry::LineString {
            coordinates: join_arcs(indexes, arcs),
        },
        TopoGeometryValue::MultiLineString { arcs: lines } => Geometry::MultiLineString {
            coordinates: lines.iter().map(|line| join_arcs(line, arcs)).collect(),
        },
        TopoGeometryValue::Polygon { arcs: rings } => Geometry::Polygon {
            coordinates: rings.iter().map(|ring| join_arcs(ring, arcs)).collect(),
        },
        TopoGeometryValue::MultiPolygon { arcs: polygons } => Geometry::MultiPolygon {
            coordinates: polygons
                .iter()
                .map(|polygon| polygon.iter().map(|ring| join_arcs(ring, arcs)).collect())
                .collect(),
        },
    }
}
