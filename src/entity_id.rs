//! Canonical entity identifiers.
//!
//! An entity id is the join key across all three data sources: the graph
//! query service, the sanitization service, and the spatial store. The
//! grammar is strict — an uppercase `Q` prefix followed by a positive integer
//! with no leading zero and at most 16 digits — so a value that validates
//! here can be passed to the spatial store without further escaping.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GeoShapesError;

lazy_static! {
    static ref ENTITY_ID_RE: Regex =
        Regex::new("^Q[1-9][0-9]{0,15}$").expect("entity id pattern is valid");
}

/// A validated entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Parse a raw token against the id grammar.
    pub fn parse(raw: &str) -> Result<Self, GeoShapesError> {
        if ENTITY_ID_RE.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(GeoShapesError::InvalidId(raw.to_string()))
        }
    }

    /// Parse the trailing path segment of an entity URI, e.g.
    /// `http://www.wikidata.org/entity/Q42` -> `Q42`.
    ///
    /// Graph query results reference entities by URI; anything whose tail is
    /// empty or fails the grammar is reported as `InvalidGraphId` rather than
    /// `InvalidId` so the caller can tell a bad request from a bad response.
    pub fn from_uri(uri: &str) -> Result<Self, GeoShapesError> {
        let tail = uri.rsplit('/').next().unwrap_or("");
        if tail.is_empty() || !ENTITY_ID_RE.is_match(tail) {
            return Err(GeoShapesError::InvalidGraphId(uri.to_string()));
        }
        Ok(Self(tail.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
