//! Recursive text collection
//!
//! Used by the research template (full text tree of a selected node) and by
//! page data (flat list of text strings per frame). Both are pure functions
//! returning their aggregate; nothing is accumulated outside the call.

use scene_graph::{NodeType, SceneNode};
use serde::Serialize;

use crate::error::ExtractError;

/// Text content of a subtree, pruned to the branches that carry text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextTree {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TextTree>>,
}

impl TextTree {
    fn is_empty(&self) -> bool {
        self.text_content.is_none() && self.children.is_none()
    }
}

fn below_limit(depth: usize, max_depth: Option<usize>) -> bool {
    max_depth.map_or(true, |max| depth < max)
}

/// Collect the text tree rooted at `node`.
///
/// Fails when the root's own text cannot be read; unreadable descendants
/// are logged and left out.
pub fn collect_text_tree(
    node: &dyn SceneNode,
    max_depth: Option<usize>,
) -> Result<TextTree, ExtractError> {
    text_tree_at(node, 0, max_depth)
}

fn text_tree_at(
    node: &dyn SceneNode,
    depth: usize,
    max_depth: Option<usize>,
) -> Result<TextTree, ExtractError> {
    let text_content = match node.text() {
        Some(text) => Some(text?.characters),
        None => None,
    };

    let mut branches = Vec::new();
    if below_limit(depth, max_depth) {
        match node.children() {
            Some(Ok(children)) => {
                for child in &children {
                    match text_tree_at(child.as_ref(), depth + 1, max_depth) {
                        Ok(tree) if tree.is_empty() => {}
                        Ok(tree) => branches.push(tree),
                        Err(err) => log::warn!(
                            "Skipping text of node '{}' under '{}': {}",
                            child.id(),
                            node.id(),
                            err
                        ),
                    }
                }
            }
            Some(Err(err)) => {
                log::warn!("Children of node '{}' unreadable: {}", node.id(), err)
            }
            None => {}
        }
    }

    Ok(TextTree {
        name: node.name().to_string(),
        id: node.id().to_string(),
        node_type: node.node_type(),
        text_content,
        children: (!branches.is_empty()).then_some(branches),
    })
}

/// Characters of the visible text nodes under `node`, in document order,
/// at most `limit` of them.
pub fn collect_text_nodes(
    node: &dyn SceneNode,
    limit: usize,
    max_depth: Option<usize>,
) -> Vec<String> {
    let mut found = Vec::new();
    text_nodes_at(node, 0, limit, max_depth, &mut found);
    found
}

fn text_nodes_at(
    node: &dyn SceneNode,
    depth: usize,
    limit: usize,
    max_depth: Option<usize>,
    found: &mut Vec<String>,
) {
    if found.len() >= limit || matches!(node.visible(), Ok(false)) {
        return;
    }
    match node.text() {
        Some(Ok(text)) => found.push(text.characters),
        Some(Err(err)) => log::debug!("Text of node '{}' unreadable: {}", node.id(), err),
        None => {}
    }
    if !below_limit(depth, max_depth) {
        return;
    }
    if let Some(Ok(children)) = node.children() {
        for child in &children {
            text_nodes_at(child.as_ref(), depth + 1, limit, max_depth, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::{MemoryHost, SceneHost};
    use serde_json::json;

    fn host() -> MemoryHost {
        MemoryHost::with_selection(json!([
            { "id": "1:1", "name": "Greeting", "type": "TEXT", "text": { "characters": "Hello" } },
            {
                "id": "2:1", "name": "Card", "type": "FRAME",
                "children": [
                    { "id": "2:2", "name": "Title", "type": "TEXT", "text": { "characters": "Pricing" } },
                    { "id": "2:3", "name": "Bg", "type": "RECTANGLE" },
                    {
                        "id": "2:4", "name": "Body", "type": "GROUP",
                        "children": [
                            { "id": "2:5", "name": "Line", "type": "TEXT", "text": { "characters": "Monthly" } },
                            { "id": "2:6", "name": "Hidden", "type": "TEXT", "visible": false,
                              "text": { "characters": "secret" } },
                            { "id": "2:7", "name": "Broken", "type": "TEXT", "faults": ["text"],
                              "text": { "characters": "x" } }
                        ]
                    }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_single_text_node() {
        let host = host();
        let tree = collect_text_tree(host.node_by_id("1:1").unwrap().as_ref(), None).unwrap();
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({ "name": "Greeting", "id": "1:1", "type": "TEXT", "textContent": "Hello" })
        );
    }

    #[test]
    fn test_tree_prunes_textless_branches() {
        let host = host();
        let tree = collect_text_tree(host.node_by_id("2:1").unwrap().as_ref(), None).unwrap();
        let children = tree.children.unwrap();
        let ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2:2", "2:4"]);

        let body: Vec<&str> = children[1]
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(body, vec!["2:5", "2:6"]);
    }

    #[test]
    fn test_failing_root_text_is_an_error() {
        let host = host();
        let broken = host.node_by_id("2:7").unwrap();
        assert!(collect_text_tree(broken.as_ref(), None).is_err());
    }

    #[test]
    fn test_tree_depth_limit() {
        let host = host();
        let tree = collect_text_tree(host.node_by_id("2:1").unwrap().as_ref(), Some(1)).unwrap();
        let children = tree.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "2:2");
    }

    #[test]
    fn test_text_nodes_skip_hidden_and_respect_limit() {
        let host = host();
        let card = host.node_by_id("2:1").unwrap();
        assert_eq!(
            collect_text_nodes(card.as_ref(), 20, None),
            vec!["Pricing".to_string(), "Monthly".to_string()]
        );
        assert_eq!(collect_text_nodes(card.as_ref(), 1, None), vec!["Pricing".to_string()]);
    }
}
