//! Fill and stroke extraction
//!
//! Solid paints keep their color (8-bit channels) and opacity; every other
//! paint is reduced to its `type`. Entries that are not well-formed paint
//! objects become `{type: "unknown"}`.

use scene_graph::{HostValue, SceneNode};

use super::require;
use crate::classifier::Facet;
use crate::error::ExtractError;
use crate::facets::{FacetValue, PaintSummary, Rgb, StrokeFacet};

/// Read an `{r, g, b}` object with channels in `0.0..=1.0`
pub fn read_color(value: &HostValue) -> Option<Rgb> {
    let r = value.get("r")?.as_f64()?;
    let g = value.get("g")?.as_f64()?;
    let b = value.get("b")?.as_f64()?;
    Some(Rgb::from_unit(r, g, b))
}

/// Reduce one paint entry
pub fn reduce_paint(paint: &HostValue) -> PaintSummary {
    let Some(kind) = paint.get("type").and_then(HostValue::as_str) else {
        return PaintSummary::unknown();
    };

    if kind != "SOLID" {
        return PaintSummary::of_kind(kind);
    }

    match paint.get("color").and_then(read_color) {
        Some(color) => {
            let opacity = paint
                .get("opacity")
                .and_then(HostValue::as_f64)
                .unwrap_or(1.0);
            PaintSummary::solid(color, opacity)
        }
        None => PaintSummary::unknown(),
    }
}

/// Reduce a paint list. Anything but an array is malformed.
pub fn reduce_paints(
    paints: &HostValue,
    facet: Facet,
    node_id: &str,
) -> Result<Vec<PaintSummary>, ExtractError> {
    match paints.as_array() {
        Some(entries) => Ok(entries.iter().map(reduce_paint).collect()),
        None => Err(ExtractError::malformed(
            facet.as_str(),
            node_id,
            format!("expected a paint array, got {}", paints.kind()),
        )),
    }
}

/// Solid colors of a paint list, in order
pub fn solid_colors(paints: &HostValue) -> Vec<Rgb> {
    paints
        .as_array()
        .unwrap_or_default()
        .iter()
        .map(reduce_paint)
        .filter_map(|paint| paint.color)
        .collect()
}

pub fn extract_fills(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let fills = require(node.fills(), Facet::Fills, node)?;
    reduce_paints(&fills, Facet::Fills, node.id()).map(FacetValue::Fills)
}

pub fn extract_strokes(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let strokes = require(node.strokes(), Facet::Strokes, node)?;
    let paints = reduce_paints(&strokes.paints, Facet::Strokes, node.id())?;
    Ok(FacetValue::Strokes(StrokeFacet {
        paints,
        stroke_weight: (!strokes.weight.is_null()).then_some(strokes.weight),
        stroke_align: strokes.align,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::{MemoryHost, SceneHost};
    use serde_json::json;

    #[test]
    fn test_reduce_solid_paint() {
        let paint = HostValue::from(json!({
            "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0 }, "opacity": 1
        }));
        assert_eq!(
            reduce_paint(&paint),
            PaintSummary::solid(Rgb { r: 255, g: 0, b: 0 }, 1.0)
        );
    }

    #[test]
    fn test_reduce_non_solid_keeps_type_only() {
        let paint = HostValue::from(json!({
            "type": "IMAGE", "imageHash": "abc", "scaleMode": "FILL"
        }));
        assert_eq!(reduce_paint(&paint), PaintSummary::of_kind("IMAGE"));
    }

    #[test]
    fn test_malformed_color_is_unknown() {
        let missing_color = HostValue::from(json!({ "type": "SOLID" }));
        let bad_channel = HostValue::from(json!({
            "type": "SOLID", "color": { "r": "red", "g": 0, "b": 0 }
        }));
        let not_object = HostValue::from(json!(42));

        assert_eq!(reduce_paint(&missing_color), PaintSummary::unknown());
        assert_eq!(reduce_paint(&bad_channel), PaintSummary::unknown());
        assert_eq!(reduce_paint(&not_object), PaintSummary::unknown());
    }

    #[test]
    fn test_mixed_fills_are_malformed() {
        let result = reduce_paints(&HostValue::Mixed, Facet::Fills, "1:1");
        assert!(matches!(result, Err(ExtractError::Malformed { .. })));
    }

    #[test]
    fn test_extract_strokes() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Outline", "type": "ELLIPSE",
            "strokes": {
                "paints": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }],
                "weight": 2,
                "align": "INSIDE"
            }
        }]))
        .unwrap();
        let node = host.node_by_id("1:1").unwrap();

        let FacetValue::Strokes(strokes) = extract_strokes(node.as_ref()).unwrap() else {
            panic!("expected strokes facet");
        };
        assert_eq!(strokes.paints.len(), 1);
        assert_eq!(strokes.stroke_weight, Some(HostValue::Number(2.0)));
        assert_eq!(strokes.stroke_align.as_deref(), Some("INSIDE"));
    }

    #[test]
    fn test_extract_fills_propagates_host_error() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Broken", "type": "RECTANGLE", "fills": [], "faults": ["fills"]
        }]))
        .unwrap();
        let node = host.node_by_id("1:1").unwrap();
        assert!(matches!(
            extract_fills(node.as_ref()),
            Err(ExtractError::Host(_))
        ));
    }
}
