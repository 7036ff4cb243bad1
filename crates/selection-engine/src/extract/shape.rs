//! Vector-shape and appearance extraction (detailed styles only)

use scene_graph::SceneNode;

use super::require;
use crate::classifier::Facet;
use crate::error::ExtractError;
use crate::facets::{AppearanceFacet, FacetValue, VectorFacet};

pub fn extract_vector(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let vector = require(node.vector(), Facet::VectorShape, node)?;
    Ok(FacetValue::Vector(VectorFacet {
        corner_radius: vector.corner_radius,
        path_count: vector.path_count,
        boolean_operation: vector.boolean_operation,
    }))
}

pub fn extract_appearance(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let appearance = require(node.appearance(), Facet::Appearance, node)?;
    Ok(FacetValue::Appearance(AppearanceFacet {
        opacity: appearance.opacity,
        blend_mode: appearance.blend_mode,
        corner_radius: appearance.corner_radius,
        clips_content: appearance.clips_content,
    }))
}
