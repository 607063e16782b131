//! Typed SPARQL binding values and per-entity property rows.
//!
//! Graph query results are column-keyed maps with no fixed schema. Rather
//! than poking at raw JSON throughout the pipeline, bindings are lifted into
//! [`GraphValue`] once, and column access goes through an explicit
//! "get required column or fail" accessor.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::entity_id::EntityId;
use crate::error::GeoShapesError;
use crate::geojson::Position;

/// XSD datatypes whose literals are carried as JSON numbers.
const NUMERIC_DATATYPES: &[&str] = &[
    "http://www.w3.org/2001/XMLSchema#integer",
    "http://www.w3.org/2001/XMLSchema#decimal",
    "http://www.w3.org/2001/XMLSchema#double",
    "http://www.w3.org/2001/XMLSchema#float",
];

/// A single SPARQL binding value.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Literal {
        value: String,
        datatype: Option<String>,
    },
    Uri(String),
    Coordinate(Position),
}

impl GraphValue {
    /// Lift a raw `{type, value, datatype?}` binding object.
    ///
    /// Unknown binding types (e.g. bnodes) are dropped; they carry nothing
    /// the pipeline can sanitize or join on.
    pub fn from_binding(binding: &Value) -> Option<Self> {
        let kind = binding.get("type")?.as_str()?;
        let value = binding.get("value")?.as_str()?;
        match kind {
            "uri" => Some(Self::Uri(value.to_string())),
            "literal" | "typed-literal" => Some(Self::Literal {
                value: value.to_string(),
                datatype: binding
                    .get("datatype")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            _ => None,
        }
    }

    /// Generic value normalization for the sanitizer: numeric literals become
    /// JSON numbers, everything else a trimmed string. Empty values are
    /// dropped entirely rather than sent for cleaning.
    pub fn normalized(&self) -> Option<Value> {
        match self {
            Self::Coordinate(_) => None,
            Self::Uri(value) => non_empty_string(value),
            Self::Literal { value, datatype } => {
                if let Some(dt) = datatype {
                    if NUMERIC_DATATYPES.contains(&dt.as_str()) {
                        if let Some(number) = parse_number(value) {
                            return Some(Value::Number(number));
                        }
                    }
                }
                non_empty_string(value)
            }
        }
    }
}

fn non_empty_string(value: &str) -> Option<Value> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Value::String(trimmed.to_string()))
    }
}

fn parse_number(value: &str) -> Option<Number> {
    if let Ok(int) = value.parse::<i64>() {
        return Some(Number::from(int));
    }
    value.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Parse a WKT-style coordinate literal, e.g. `Point(12.4924 41.8902)`.
///
/// The literal carries longitude first, matching GeoJSON position order.
pub fn parse_coordinate_literal(raw: &str) -> Option<Position> {
    let body = raw
        .trim()
        .strip_prefix("Point(")
        .or_else(|| raw.trim().strip_prefix("POINT("))?
        .strip_suffix(')')?;
    let mut parts = body.split_whitespace();
    let lon: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([lon, lat])
}

/// One graph-query result row, keyed by entity id.
///
/// `columns` holds every non-id binding except a successfully parsed
/// coordinate literal, which is promoted to `coordinate`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPropertyRow {
    pub id: EntityId,
    pub coordinate: Option<Position>,
    pub columns: BTreeMap<String, GraphValue>,
}

/// Column-keyed access to one raw binding row.
pub struct BindingRow<'a> {
    columns: &'a Map<String, Value>,
}

impl<'a> BindingRow<'a> {
    pub fn new(columns: &'a Map<String, Value>) -> Self {
        Self { columns }
    }

    /// Fetch a required column, failing with a `MissingIdColumn` message that
    /// names the column and whether the caller chose it.
    pub fn require(
        &self,
        column: &str,
        user_supplied: bool,
    ) -> Result<&'a Value, GeoShapesError> {
        self.columns
            .get(column)
            .ok_or_else(|| GeoShapesError::missing_id_column(column, user_supplied))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.columns.iter()
    }
}
