//! Auto-layout extraction for frame-like nodes

use scene_graph::SceneNode;

use super::require;
use crate::classifier::Facet;
use crate::error::ExtractError;
use crate::facets::{FacetValue, LayoutFacet, Padding};

fn direction(layout_mode: &str) -> Option<String> {
    match layout_mode {
        "HORIZONTAL" => Some("horizontal".to_string()),
        "VERTICAL" => Some("vertical".to_string()),
        _ => None,
    }
}

pub fn extract_layout(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let layout = require(node.layout(), Facet::Layout, node)?;
    Ok(FacetValue::Layout(LayoutFacet {
        direction: direction(&layout.layout_mode),
        layout_mode: layout.layout_mode,
        primary_axis_align_items: layout.primary_axis_align_items,
        counter_axis_align_items: layout.counter_axis_align_items,
        padding: Padding {
            top: layout.padding_top,
            right: layout.padding_right,
            bottom: layout.padding_bottom,
            left: layout.padding_left,
        },
        item_spacing: layout.item_spacing,
        layout_wrap: layout.layout_wrap,
    }))
}
