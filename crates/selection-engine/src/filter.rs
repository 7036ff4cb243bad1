//! Selection filter
//!
//! Drops nodes whose width or height exceeds the configured maximum before
//! any extraction runs. Skipped nodes are reported individually so callers
//! can tell "too large" apart from "nothing selected".

use scene_graph::{NodeRef, SceneHost, SceneNode, Size};
use serde::Serialize;

/// Why a node was left out of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Oversized,
}

/// A node removed by the filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedNode {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub reason: SkipReason,
}

/// Result of filtering a selection
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<NodeRef>,
    pub skipped: Vec<SkippedNode>,
}

impl FilterOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Bounding dimensions of a node, preferring its own size
fn dimensions(node: &dyn SceneNode) -> Option<Size> {
    match node.size() {
        Some(Ok(size)) => return Some(size),
        Some(Err(err)) => log::debug!("Size of '{}' unreadable: {}", node.id(), err),
        None => {}
    }
    match node.absolute_bounding_box() {
        Some(Ok(rect)) => Some(Size {
            width: rect.width,
            height: rect.height,
        }),
        Some(Err(err)) => {
            log::debug!("Bounds of '{}' unreadable: {}", node.id(), err);
            None
        }
        None => None,
    }
}

/// Split `nodes` into kept and oversized. Nodes without readable
/// dimensions are kept.
pub fn filter_oversized(nodes: Vec<NodeRef>, max_dimension: f64) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for node in nodes {
        match dimensions(node.as_ref()) {
            Some(size) if size.width > max_dimension || size.height > max_dimension => {
                outcome.skipped.push(SkippedNode {
                    id: node.id().to_string(),
                    name: node.name().to_string(),
                    width: size.width,
                    height: size.height,
                    reason: SkipReason::Oversized,
                });
            }
            _ => outcome.kept.push(node),
        }
    }
    outcome
}

/// Filter and tell the user how many nodes were skipped
pub fn filter_selection(
    host: &dyn SceneHost,
    nodes: Vec<NodeRef>,
    max_dimension: f64,
) -> FilterOutcome {
    let outcome = filter_oversized(nodes, max_dimension);
    if outcome.skipped_count() > 0 {
        log::info!(
            "Skipped {} oversized node(s): {:?}",
            outcome.skipped_count(),
            outcome.skipped.iter().map(|s| &s.id).collect::<Vec<_>>()
        );
        host.notify(&format!(
            "Skipped {} element(s) larger than {}px",
            outcome.skipped_count(),
            max_dimension
        ));
    }
    outcome
}
