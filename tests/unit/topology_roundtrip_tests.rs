//! Property-preservation law: topology-encoding a feature collection and
//! decoding it again must leave every feature's properties untouched.

use geoshapes::geojson::{Feature, FeatureCollection, Geometry, Position};
use geoshapes::topology;
use serde_json::{json, Map, Value};

fn ring(offset: f64) -> Vec<Position> {
    vec![
        [offset, 0.0],
        [offset + 1.0, 0.0],
        [offset + 1.0, 1.0],
        [offset, 1.0],
        [offset, 0.0],
    ]
}

fn collection(n: usize) -> FeatureCollection {
    let features = (0..n)
        .map(|i| {
            let mut properties = Map::new();
            properties.insert("name".to_string(), Value::String(format!("feature-{i}")));
            properties.insert("rank".to_string(), json!(i));
            properties.insert("marker-color".to_string(), json!("0050d0"));
            Feature::new(
                format!("Q{}", i + 1),
                Geometry::Polygon {
                    coordinates: vec![ring(i as f64 * 2.0)],
                },
                properties,
            )
        })
        .collect();
    FeatureCollection::new(features)
}

#[test]
fn round_trip_preserves_count_ids_and_property_sets() {
    for n in [0, 1, 5, 20] {
        let original = collection(n);

        let decoded = topology::decode(&topology::encode(&original));

        assert_eq!(decoded.features.len(), n);
        for (before, after) in original.features.iter().zip(&decoded.features) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.properties, after.properties);
        }
    }
}

#[test]
fn round_trip_preserves_mixed_geometry_kinds() {
    let mut properties = Map::new();
    properties.insert("title".to_string(), json!("mixed"));
    let original = FeatureCollection::new(vec![
        Feature::new(
            "Q1",
            Geometry::MultiPolygon {
                coordinates: vec![vec![ring(0.0)], vec![ring(4.0)]],
            },
            properties.clone(),
        ),
        Feature::new(
            "Q2",
            Geometry::MultiLineString {
                coordinates: vec![vec![[0.0, 0.0], [1.0, 2.0]], vec![[3.0, 3.0], [4.0, 5.0]]],
            },
            Map::new(),
        ),
        Feature::new(
            "Q3",
            Geometry::MultiPoint {
                coordinates: vec![[7.0, 8.0], [9.0, 10.0]],
            },
            Map::new(),
        ),
    ]);

    let decoded = topology::decode(&topology::encode(&original));

    for (before, after) in original.features.iter().zip(&decoded.features) {
        assert_eq!(before.geometry, after.geometry);
        assert_eq!(before.properties, after.properties);
    }
}

#[test]
fn encoding_is_smaller_than_flat_for_shared_boundaries() {
    let shared = ring(0.0);
    let features = (0..10)
        .map(|i| {
            Feature::new(
                format!("Q{}", i + 1),
                Geometry::Polygon {
                    coordinates: vec![shared.clone()],
                },
                Map::new(),
            )
        })
        .collect();
    let collection = FeatureCollection::new(features);

    let topology = topology::encode(&collection);

    // Ten identical boundaries collapse into a single shared arc.
    assert_eq!(topology.arcs.len(), 1);
}
