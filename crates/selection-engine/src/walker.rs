//! Bounded tree walker
//!
//! Builds a `HierarchyNode` per node: summary, absolute bounds, facets, and
//! at most `max_fanout` children in the host's native order. Fan-out is
//! bounded at every level; depth is bounded by `max_depth` when set.
//!
//! A child whose summary cannot be read is skipped (and logged) without
//! affecting its siblings.

use scene_graph::SceneNode;
use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::constants::limits;
use crate::error::ExtractError;
use crate::extract::FacetRegistry;
use crate::facets::{ExtractedFacets, NodeSummary};

/// How much styling the walker attaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleDetail {
    /// Fills, text, layout and component binding
    #[default]
    Light,
    /// Light facets plus `detailedStyles`
    Detailed,
}

/// Traversal bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkOptions {
    pub max_fanout: usize,
    pub max_depth: Option<usize>,
    pub detail: StyleDetail,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_fanout: limits::MAX_FANOUT,
            max_depth: Some(limits::MAX_DEPTH),
            detail: StyleDetail::Light,
        }
    }
}

impl WalkOptions {
    pub fn from_config(config: &SelectionConfig, detail: StyleDetail) -> Self {
        Self {
            max_fanout: config.max_fanout,
            max_depth: config.max_depth,
            detail,
        }
    }
}

/// One node of a walked hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    #[serde(flatten)]
    pub summary: NodeSummary,
    #[serde(flatten)]
    pub facets: ExtractedFacets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_count: Option<usize>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub depth_limited: bool,
}

/// Recursive walker over a registry of extractors
pub struct TreeWalker<'r> {
    registry: &'r FacetRegistry,
    options: WalkOptions,
}

impl HierarchyNode {
    /// Identity only, for a node that could not be walked
    pub fn minimal(node: &dyn SceneNode) -> Self {
        Self {
            summary: NodeSummary::minimal(node),
            facets: ExtractedFacets::default(),
            children: None,
            truncated: None,
            children_count: None,
            depth_limited: false,
        }
    }
}

impl<'r> TreeWalker<'r> {
    pub fn new(registry: &'r FacetRegistry, options: WalkOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Walk the subtree rooted at `node`.
    ///
    /// Fails only when the root's own summary cannot be read.
    pub fn walk(&self, node: &dyn SceneNode) -> Result<HierarchyNode, ExtractError> {
        self.walk_at(node, 0)
    }

    fn walk_at(&self, node: &dyn SceneNode, depth: usize) -> Result<HierarchyNode, ExtractError> {
        let summary = NodeSummary::read(node)?;

        let mut facets = self.registry.extract_facets(node, self.options.detail);
        facets.bounds = match node.absolute_bounding_box() {
            Some(Ok(rect)) => Some(rect),
            Some(Err(err)) => {
                log::warn!("Skipping bounds of node '{}': {}", node.id(), err);
                None
            }
            None => None,
        };

        let mut hierarchy = HierarchyNode {
            summary,
            facets,
            children: None,
            truncated: None,
            children_count: None,
            depth_limited: false,
        };

        let children = match node.children() {
            Some(Ok(children)) => children,
            Some(Err(err)) => {
                log::warn!("Skipping children of node '{}': {}", node.id(), err);
                return Ok(hierarchy);
            }
            None => return Ok(hierarchy),
        };

        let count = children.len();
        hierarchy.children_count = Some(count);
        hierarchy.truncated = Some(count > self.options.max_fanout);

        if self.options.max_depth.is_some_and(|max| depth >= max) {
            log::debug!(
                "Depth limit reached at node '{}' ({} children not walked)",
                node.id(),
                count
            );
            hierarchy.depth_limited = true;
            return Ok(hierarchy);
        }

        let walked = children
            .iter()
            .take(self.options.max_fanout)
            .filter_map(|child| match self.walk_at(child.as_ref(), depth + 1) {
                Ok(child_hierarchy) => Some(child_hierarchy),
                Err(err) => {
                    log::warn!(
                        "Skipping child '{}' of node '{}': {}",
                        child.id(),
                        node.id(),
                        err
                    );
                    None
                }
            })
            .collect();
        hierarchy.children = Some(walked);

        Ok(hierarchy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::{MemoryHost, SceneHost};
    use serde_json::{json, Value};

    fn rectangles(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| {
                json!({
                    "id": format!("2:{}", i),
                    "name": format!("Rect {}", i),
                    "type": "RECTANGLE",
                    "width": 10, "height": 10
                })
            })
            .collect()
    }

    fn walk(host: &MemoryHost, id: &str, options: WalkOptions) -> HierarchyNode {
        let registry = FacetRegistry::standard();
        let node = host.node_by_id(id).unwrap();
        TreeWalker::new(&registry, options)
            .walk(node.as_ref())
            .unwrap()
    }

    fn assert_fanout_bound(node: &HierarchyNode, cap: usize) {
        if let Some(children) = &node.children {
            assert!(children.len() <= cap);
            assert_eq!(node.truncated, Some(node.children_count.unwrap() > cap));
            for child in children {
                assert_fanout_bound(child, cap);
            }
        }
    }

    #[test]
    fn test_fanout_truncation() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Frame", "type": "FRAME",
            "width": 400, "height": 400,
            "children": rectangles(15)
        }]))
        .unwrap();

        let hierarchy = walk(&host, "1:1", WalkOptions::default());
        let children = hierarchy.children.as_ref().unwrap();
        assert_eq!(children.len(), 10);
        assert_eq!(hierarchy.truncated, Some(true));
        assert_eq!(hierarchy.children_count, Some(15));
        assert_eq!(children[0].summary.id, "2:0");
        assert_eq!(children[9].summary.id, "2:9");
    }

    #[test]
    fn test_fanout_bound_holds_at_every_level() {
        let nested: Vec<Value> = (0..4)
            .map(|i| {
                json!({
                    "id": format!("3:{}", i),
                    "name": "Group",
                    "type": "GROUP",
                    "children": rectangles(i * 2)
                })
            })
            .collect();
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Root", "type": "FRAME", "children": nested
        }]))
        .unwrap();

        let options = WalkOptions {
            max_fanout: 3,
            ..WalkOptions::default()
        };
        assert_fanout_bound(&walk(&host, "1:1", options), 3);
    }

    #[test]
    fn test_bounds_attached() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Card", "type": "RECTANGLE",
            "x": 10, "y": 20, "width": 50, "height": 60
        }]))
        .unwrap();

        let hierarchy = walk(&host, "1:1", WalkOptions::default());
        let bounds = hierarchy.facets.bounds.unwrap();
        assert_eq!((bounds.x, bounds.y, bounds.width, bounds.height), (10.0, 20.0, 50.0, 60.0));
        assert!(hierarchy.children.is_none());
        assert!(hierarchy.truncated.is_none());
    }

    #[test]
    fn test_failing_child_is_skipped() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Frame", "type": "FRAME",
            "children": [
                { "id": "2:1", "name": "Ok", "type": "RECTANGLE" },
                { "id": "2:2", "name": "Broken", "type": "RECTANGLE", "faults": ["visible"] },
                { "id": "2:3", "name": "Also ok", "type": "TEXT", "text": { "characters": "x" } }
            ]
        }]))
        .unwrap();

        let hierarchy = walk(&host, "1:1", WalkOptions::default());
        let ids: Vec<&str> = hierarchy
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|child| child.summary.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2:1", "2:3"]);
        assert_eq!(hierarchy.children_count, Some(3));
    }

    #[test]
    fn test_depth_limit() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "L0", "type": "FRAME",
            "children": [{
                "id": "1:2", "name": "L1", "type": "FRAME",
                "children": [{ "id": "1:3", "name": "L2", "type": "FRAME", "children": [] }]
            }]
        }]))
        .unwrap();

        let options = WalkOptions {
            max_depth: Some(1),
            ..WalkOptions::default()
        };
        let hierarchy = walk(&host, "1:1", options);
        let level1 = &hierarchy.children.as_ref().unwrap()[0];
        assert!(level1.depth_limited);
        assert!(level1.children.is_none());
        assert_eq!(level1.children_count, Some(1));

        let encoded = serde_json::to_value(&hierarchy).unwrap();
        assert!(encoded.get("depthLimited").is_none());
        assert_eq!(encoded["children"][0]["depthLimited"], true);
    }

    #[test]
    fn test_detailed_walk_attaches_detailed_styles() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Frame", "type": "FRAME",
            "appearance": { "opacity": 0.8 },
            "children": [{
                "id": "1:2", "name": "Shadowed", "type": "RECTANGLE",
                "effects": [{ "type": "DROP_SHADOW" }]
            }]
        }]))
        .unwrap();

        let options = WalkOptions {
            detail: StyleDetail::Detailed,
            ..WalkOptions::default()
        };
        let hierarchy = walk(&host, "1:1", options);
        assert!(hierarchy.facets.detailed_styles.is_some());
        let child = &hierarchy.children.unwrap()[0];
        assert!(child.facets.detailed_styles.as_ref().unwrap().effects.is_some());

        let light = walk(&host, "1:1", WalkOptions::default());
        assert!(light.facets.detailed_styles.is_none());
    }
}
