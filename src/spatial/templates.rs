//! Named SQL templates for the spatial store.
//!
//! Each template declares an ordered list of named parameters with defaults.
//! A request may override a parameter only with a value matching the strict
//! numeric-literal grammar; everything else is rejected before the query is
//! built, so user input can tune simplification behaviour but never reach
//! the SQL text.
//!
//! Placeholders: `{table}` is replaced with the configured table identifier,
//! `$1` binds the id list as `text[]`, and `$2..` bind the declared
//! parameters in order.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref NUMERIC_LITERAL_RE: Regex =
        Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("numeric literal pattern is valid");
}

/// True when `value` is a plain decimal literal, optionally signed.
///
/// This is the *accept* condition for request-supplied template parameters.
pub fn is_numeric_literal(value: &str) -> bool {
    NUMERIC_LITERAL_RE.is_match(value)
}

/// A tunable template parameter with its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateParam {
    pub name: String,
    pub default: String,
}

impl TemplateParam {
    fn new(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            default: default.to_string(),
        }
    }
}

/// A parameterized geometry query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlTemplate {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<TemplateParam>,
}

impl SqlTemplate {
    fn new(sql: &str, params: Vec<TemplateParam>) -> Self {
        Self {
            sql: sql.to_string(),
            params,
        }
    }
}

/// Name of the baseline template used when a profile is unknown.
pub const BASELINE_PROFILE: &str = "default";

lazy_static! {
    static ref BASELINE_TEMPLATE: SqlTemplate = SqlTemplate::new(
        "SELECT wikidata AS id, ST_AsGeoJSON(ST_Transform(way, 4326)) AS data \
         FROM {table} WHERE wikidata = ANY($1)",
        vec![],
    );
}

/// The baseline template, independent of any configuration.
pub fn baseline() -> &'static SqlTemplate {
    &BASELINE_TEMPLATE
}

/// Built-in query profiles.
///
/// `simplify` and `removerepeated` take an absolute tolerance in degrees;
/// `simplifyarea` scales the tolerance by the bounding-box size so large
/// shapes are simplified more aggressively than small ones.
pub fn builtin_templates() -> HashMap<String, SqlTemplate> {
    let mut templates = HashMap::new();
    templates.insert(BASELINE_PROFILE.to_string(), baseline().clone());
    templates.insert(
        "simplify".to_string(),
        SqlTemplate::new(
            "SELECT wikidata AS id, \
             ST_AsGeoJSON(ST_Simplify(ST_Transform(way, 4326), $2::float8)) AS data \
             FROM {table} WHERE wikidata = ANY($1)",
            vec![TemplateParam::new("tolerance", "0.0001")],
        ),
    );
    templates.insert(
        "simplifyarea".to_string(),
        SqlTemplate::new(
            "SELECT wikidata AS id, \
             ST_AsGeoJSON(ST_Simplify(ST_Transform(way, 4326), \
             $2::float8 * SQRT(ST_Area(ST_Envelope(ST_Transform(way, 4326)))))) AS data \
             FROM {table} WHERE wikidata = ANY($1)",
            vec![TemplateParam::new("factor", "0.01")],
        ),
    );
    templates.insert(
        "removerepeated".to_string(),
        SqlTemplate::new(
            "SELECT wikidata AS id, \
             ST_AsGeoJSON(ST_RemoveRepeatedPoints(ST_Transform(way, 4326), $2::float8)) AS data \
             FROM {table} WHERE wikidata = ANY($1)",
            vec![TemplateParam::new("tolerance", "0")],
        ),
    );
    templates
}
