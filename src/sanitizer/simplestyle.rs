//! Simplestyle property key canonicalization.
//!
//! Graph query column names cannot contain hyphens, so styling properties
//! arrive underscore-separated. The map styling convention expects the
//! hyphenated form; remap before values are sent for sanitization.

/// Canonical form of a property key.
///
/// Keys outside the simplestyle family pass through unchanged.
pub fn canonical_key(name: &str) -> &str {
    match name {
        "marker_color" => "marker-color",
        "marker_size" => "marker-size",
        "marker_symbol" => "marker-symbol",
        "stroke_width" => "stroke-width",
        "stroke_opacity" => "stroke-opacity",
        "fill_opacity" => "fill-opacity",
        other => other,
    }
}
