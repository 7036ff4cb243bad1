//! Attribute extractors and the facet registry
//!
//! Each extractor turns one facet of a node into its serialization-safe
//! record. Extractors are independent: a failure in one is logged and only
//! drops that facet from the node's output.
//!
//! The registry maps facets to extractors, so adding a facet means
//! registering one more function rather than touching the walker.

pub mod component;
pub mod effects;
pub mod layout;
pub mod paint;
pub mod shape;
pub mod text;

use scene_graph::{Probe, SceneNode};

use crate::classifier::{classify, Facet, FacetSet};
use crate::error::ExtractError;
use crate::facets::{ExtractedFacets, FacetValue};
use crate::walker::StyleDetail;

/// Signature shared by all facet extractors
pub type Extractor = fn(&dyn SceneNode) -> Result<FacetValue, ExtractError>;

/// Unwrap a capability probe, turning absence into `ExtractError::Missing`
pub(crate) fn require<T>(
    probe: Probe<T>,
    facet: Facet,
    node: &dyn SceneNode,
) -> Result<T, ExtractError> {
    match probe {
        Some(result) => Ok(result?),
        None => Err(ExtractError::missing(facet.as_str(), node.id())),
    }
}

/// Facet to extractor mapping
#[derive(Clone)]
pub struct FacetRegistry {
    extractors: Vec<(Facet, Extractor)>,
}

impl FacetRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registry with every built-in extractor
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Facet::Fills, paint::extract_fills);
        registry.register(Facet::Strokes, paint::extract_strokes);
        registry.register(Facet::Effects, effects::extract_effects);
        registry.register(Facet::Text, text::extract_text);
        registry.register(Facet::Layout, layout::extract_layout);
        registry.register(Facet::Instance, component::extract_component);
        registry.register(Facet::VectorShape, shape::extract_vector);
        registry.register(Facet::Appearance, shape::extract_appearance);
        registry
    }

    /// Register an extractor, replacing any previous one for the facet
    pub fn register(&mut self, facet: Facet, extractor: Extractor) {
        self.extractors.retain(|(existing, _)| *existing != facet);
        self.extractors.push((facet, extractor));
    }

    pub fn has_extractor(&self, facet: Facet) -> bool {
        self.extractors.iter().any(|(existing, _)| *existing == facet)
    }

    /// Run the extractors for `wanted`, dropping (and logging) failures
    pub fn extract(&self, node: &dyn SceneNode, wanted: FacetSet) -> Vec<FacetValue> {
        self.extractors
            .iter()
            .filter(|(facet, _)| wanted.contains(*facet))
            .filter_map(|(facet, extractor)| match extractor(node) {
                Ok(value) => Some(value),
                Err(ExtractError::Missing { .. }) => None,
                Err(err) => {
                    log::warn!(
                        "Dropping '{}' facet of node '{}': {}",
                        facet,
                        node.id(),
                        err
                    );
                    None
                }
            })
            .collect()
    }

    /// Classify the node and extract the facets for the given detail level
    pub fn extract_facets(&self, node: &dyn SceneNode, detail: StyleDetail) -> ExtractedFacets {
        let exposed = classify(node);
        let wanted = match detail {
            StyleDetail::Light => exposed.intersection(FacetSet::LIGHT),
            StyleDetail::Detailed => exposed,
        };
        self.extract(node, wanted).into_iter().collect()
    }
}

impl Default for FacetRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for FacetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.extractors.iter().map(|(facet, _)| facet))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::PaintSummary;
    use scene_graph::{MemoryHost, SceneHost};
    use serde_json::json;

    fn fixed_fill(_node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
        Ok(FacetValue::Fills(vec![PaintSummary::of_kind("CUSTOM")]))
    }

    fn host() -> MemoryHost {
        MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Box", "type": "FRAME",
            "fills": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 1 }, "opacity": 1 }],
            "effects": [{ "type": "DROP_SHADOW", "radius": 4 }],
            "layout": { "layoutMode": "VERTICAL" },
            "faults": ["text"],
            "text": { "characters": "never read" }
        }]))
        .unwrap()
    }

    #[test]
    fn test_light_extraction_skips_detail_facets() {
        let host = host();
        let node = host.node_by_id("1:1").unwrap();
        let facets = FacetRegistry::standard().extract_facets(node.as_ref(), StyleDetail::Light);

        assert!(facets.fills.is_some());
        assert!(facets.layout.is_some());
        assert!(facets.text.is_none(), "throwing facet is dropped");
        assert!(facets.detailed_styles.is_none());
    }

    #[test]
    fn test_detailed_extraction_adds_detailed_styles() {
        let host = host();
        let node = host.node_by_id("1:1").unwrap();
        let facets =
            FacetRegistry::standard().extract_facets(node.as_ref(), StyleDetail::Detailed);

        let detailed = facets.detailed_styles.unwrap();
        assert_eq!(detailed.effects.unwrap()[0].kind, "DROP_SHADOW");
    }

    #[test]
    fn test_register_replaces_extractor() {
        let host = host();
        let node = host.node_by_id("1:1").unwrap();
        let mut registry = FacetRegistry::standard();
        registry.register(Facet::Fills, fixed_fill);

        let facets = registry.extract_facets(node.as_ref(), StyleDetail::Light);
        assert_eq!(facets.fills.unwrap()[0].kind, "CUSTOM");
        assert!(registry.has_extractor(Facet::Text));
    }
}
