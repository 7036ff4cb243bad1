//! In-memory host backed by a JSON document snapshot
//!
//! Used by the tests of every crate and by the offline plugin binary. The
//! snapshot mirrors the host's own property names (camelCase). Any property
//! listed in a node's `faults` throws on access, which lets callers exercise
//! the degradation paths without a real host.
//!
//! ```json
//! {
//!   "document": { "id": "0:0", "name": "Doc", "type": "DOCUMENT", "children": [ ... ] },
//!   "selection": ["1:2"],
//!   "paintStyles": [{ "id": "S:1", "name": "Brand/Red", "paints": [ ... ] }]
//! }
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{HostError, Result};
use crate::host::{EffectStyle, ExportSettings, ImageFormat, PaintStyle, SceneHost, TextStyle};
use crate::node::{
    AppearanceProps, InstanceProps, LayoutProps, NodeRef, NodeType, Probe, Rect, SceneNode, Size,
    StrokeProps, TextProps, VectorProps,
};
use crate::value::HostValue;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

fn default_visible() -> bool {
    true
}

/// A scene node decoded from a snapshot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub absolute_bounding_box: Option<Rect>,
    pub fills: Option<HostValue>,
    pub strokes: Option<StrokeProps>,
    pub effects: Option<HostValue>,
    pub text: Option<TextProps>,
    pub layout: Option<LayoutProps>,
    pub instance: Option<InstanceProps>,
    pub main_component: Option<Arc<MemoryNode>>,
    pub vector: Option<VectorProps>,
    pub appearance: Option<AppearanceProps>,
    pub backgrounds: Option<HostValue>,
    pub children: Option<Vec<Arc<MemoryNode>>>,
    /// Properties that throw on access
    #[serde(default)]
    pub faults: BTreeSet<String>,
}

impl MemoryNode {
    fn probe<T: Clone>(&self, property: &str, value: Option<&T>) -> Probe<T> {
        if self.faults.contains(property) {
            return Some(Err(HostError::property(
                &self.id,
                property,
                "access threw in host",
            )));
        }
        value.cloned().map(Ok)
    }

    fn collect_index(node: &Arc<MemoryNode>) -> Vec<(String, Arc<MemoryNode>)> {
        let mut entries = vec![(node.id.clone(), Arc::clone(node))];
        if let Some(children) = &node.children {
            for child in children {
                entries.extend(Self::collect_index(child));
            }
        }
        entries
    }
}

impl SceneNode for MemoryNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> NodeType {
        self.node_type.clone()
    }

    fn visible(&self) -> Result<bool> {
        match self.probe("visible", Some(&self.visible)) {
            Some(result) => result,
            None => Ok(self.visible),
        }
    }

    fn size(&self) -> Probe<Size> {
        let size = match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Size { width, height }),
            _ => None,
        };
        self.probe("size", size.as_ref())
    }

    fn absolute_bounding_box(&self) -> Probe<Rect> {
        let rect = self.absolute_bounding_box.or(match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Rect {
                x: self.x,
                y: self.y,
                width,
                height,
            }),
            _ => None,
        });
        self.probe("absoluteBoundingBox", rect.as_ref())
    }

    fn fills(&self) -> Probe<HostValue> {
        self.probe("fills", self.fills.as_ref())
    }

    fn strokes(&self) -> Probe<StrokeProps> {
        self.probe("strokes", self.strokes.as_ref())
    }

    fn effects(&self) -> Probe<HostValue> {
        self.probe("effects", self.effects.as_ref())
    }

    fn text(&self) -> Probe<TextProps> {
        self.probe("text", self.text.as_ref())
    }

    fn layout(&self) -> Probe<LayoutProps> {
        self.probe("layout", self.layout.as_ref())
    }

    fn instance(&self) -> Probe<InstanceProps> {
        self.probe("instance", self.instance.as_ref())
    }

    fn main_component(&self) -> Probe<NodeRef> {
        if self.faults.contains("mainComponent") {
            return Some(Err(HostError::property(
                &self.id,
                "mainComponent",
                "access threw in host",
            )));
        }
        let binding = self.instance.as_ref()?;
        Some(match &self.main_component {
            Some(component) => Ok(Arc::clone(component) as NodeRef),
            None => Err(HostError::NodeNotFound(
                binding
                    .component_id
                    .clone()
                    .unwrap_or_else(|| format!("{}:mainComponent", self.id)),
            )),
        })
    }

    fn vector(&self) -> Probe<VectorProps> {
        self.probe("vector", self.vector.as_ref())
    }

    fn appearance(&self) -> Probe<AppearanceProps> {
        self.probe("appearance", self.appearance.as_ref())
    }

    fn backgrounds(&self) -> Probe<HostValue> {
        self.probe("backgrounds", self.backgrounds.as_ref())
    }

    fn children(&self) -> Probe<Vec<NodeRef>> {
        self.probe("children", self.children.as_ref()).map(|result| {
            result.map(|children| {
                children
                    .into_iter()
                    .map(|child| child as NodeRef)
                    .collect()
            })
        })
    }
}

/// Top-level snapshot format
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub document: MemoryNode,
    #[serde(default)]
    pub selection: Vec<String>,
    #[serde(default)]
    pub current_page: Option<String>,
    #[serde(default)]
    pub paint_styles: Vec<PaintStyle>,
    #[serde(default)]
    pub text_styles: Vec<TextStyle>,
    #[serde(default)]
    pub effect_styles: Vec<EffectStyle>,
    /// Node ids whose raster export fails
    #[serde(default)]
    pub failing_exports: Vec<String>,
    /// Make style enumeration throw
    #[serde(default)]
    pub failing_styles: bool,
}

/// JSON-backed `SceneHost`
#[derive(Debug)]
pub struct MemoryHost {
    document: Arc<MemoryNode>,
    current_page: Arc<MemoryNode>,
    selection: Vec<Arc<MemoryNode>>,
    index: HashMap<String, Arc<MemoryNode>>,
    paint_styles: Vec<PaintStyle>,
    text_styles: Vec<TextStyle>,
    effect_styles: Vec<EffectStyle>,
    failing_exports: HashSet<String>,
    failing_styles: bool,
    notifications: Mutex<Vec<String>>,
}

impl MemoryHost {
    /// Build a host from a decoded snapshot
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self> {
        let document = Arc::new(snapshot.document);
        let index: HashMap<String, Arc<MemoryNode>> =
            MemoryNode::collect_index(&document).into_iter().collect();

        let current_page = match &snapshot.current_page {
            Some(page_id) => index
                .get(page_id)
                .cloned()
                .ok_or_else(|| HostError::NodeNotFound(page_id.clone()))?,
            None => document
                .children
                .iter()
                .flatten()
                .find(|child| child.node_type == NodeType::Page)
                .cloned()
                .unwrap_or_else(|| Arc::clone(&document)),
        };

        let selection = snapshot
            .selection
            .iter()
            .map(|id| {
                index
                    .get(id)
                    .cloned()
                    .ok_or_else(|| HostError::NodeNotFound(id.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            document,
            current_page,
            selection,
            index,
            paint_styles: snapshot.paint_styles,
            text_styles: snapshot.text_styles,
            effect_styles: snapshot.effect_styles,
            failing_exports: snapshot.failing_exports.into_iter().collect(),
            failing_styles: snapshot.failing_styles,
            notifications: Mutex::new(Vec::new()),
        })
    }

    /// Decode a snapshot from JSON
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let snapshot: DocumentSnapshot = serde_json::from_value(value)?;
        Self::from_snapshot(snapshot)
    }

    /// Build a one-page document whose top-level nodes are all selected
    pub fn with_selection(nodes: serde_json::Value) -> Result<Self> {
        let selection: Vec<String> = nodes
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").and_then(|id| id.as_str()))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self::from_json(serde_json::json!({
            "document": {
                "id": "0:0",
                "name": "Document",
                "type": "DOCUMENT",
                "children": [{
                    "id": "0:1",
                    "name": "Page 1",
                    "type": "PAGE",
                    "children": nodes
                }]
            },
            "selection": selection
        }))
    }

    /// Messages shown to the user so far
    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().clone()
    }
}

#[async_trait]
impl SceneHost for MemoryHost {
    fn selection(&self) -> Vec<NodeRef> {
        self.selection
            .iter()
            .map(|node| Arc::clone(node) as NodeRef)
            .collect()
    }

    fn current_page(&self) -> NodeRef {
        Arc::clone(&self.current_page) as NodeRef
    }

    fn document(&self) -> NodeRef {
        Arc::clone(&self.document) as NodeRef
    }

    fn node_by_id(&self, id: &str) -> Option<NodeRef> {
        self.index.get(id).map(|node| Arc::clone(node) as NodeRef)
    }

    fn notify(&self, message: &str) {
        log::info!("Host notification: {}", message);
        self.notifications.lock().push(message.to_string());
    }

    async fn export_image(&self, node_id: &str, settings: &ExportSettings) -> Result<Vec<u8>> {
        if !self.index.contains_key(node_id) {
            return Err(HostError::NodeNotFound(node_id.to_string()));
        }
        if self.failing_exports.contains(node_id) {
            return Err(HostError::export(node_id, "encoder rejected node"));
        }
        if settings.scale <= 0.0 {
            return Err(HostError::export(
                node_id,
                format!("invalid scale {}", settings.scale),
            ));
        }

        let mut bytes = match settings.format {
            ImageFormat::Png => PNG_SIGNATURE.to_vec(),
            ImageFormat::Jpg => JPEG_SIGNATURE.to_vec(),
        };
        bytes.extend_from_slice(node_id.as_bytes());
        Ok(bytes)
    }

    fn paint_styles(&self) -> Result<Vec<PaintStyle>> {
        if self.failing_styles {
            return Err(HostError::Styles("paint styles unavailable".to_string()));
        }
        Ok(self.paint_styles.clone())
    }

    fn text_styles(&self) -> Result<Vec<TextStyle>> {
        if self.failing_styles {
            return Err(HostError::Styles("text styles unavailable".to_string()));
        }
        Ok(self.text_styles.clone())
    }

    fn effect_styles(&self) -> Result<Vec<EffectStyle>> {
        if self.failing_styles {
            return Err(HostError::Styles("effect styles unavailable".to_string()));
        }
        Ok(self.effect_styles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_host() -> MemoryHost {
        MemoryHost::with_selection(json!([
            {
                "id": "1:1",
                "name": "Card",
                "type": "FRAME",
                "width": 200,
                "height": 100,
                "children": [
                    { "id": "1:2", "name": "Title", "type": "TEXT",
                      "text": { "characters": "Hello" }, "faults": ["fills"] }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_with_selection_selects_top_level() {
        let host = sample_host();
        let selection = host.selection();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].id(), "1:1");
        assert_eq!(host.current_page().node_type(), NodeType::Page);
    }

    #[test]
    fn test_node_lookup_and_children() {
        let host = sample_host();
        let frame = host.node_by_id("1:1").unwrap();
        let children = frame.children().unwrap().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), "Title");
        assert!(host.node_by_id("9:9").is_none());
    }

    #[test]
    fn test_fault_injection() {
        let host = sample_host();
        let title = host.node_by_id("1:2").unwrap();
        assert!(matches!(title.fills(), Some(Err(HostError::PropertyAccess { .. }))));
        assert!(title.text().unwrap().is_ok());
    }

    #[test]
    fn test_bounding_box_derived_from_size() {
        let host = sample_host();
        let frame = host.node_by_id("1:1").unwrap();
        let rect = frame.absolute_bounding_box().unwrap().unwrap();
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn test_unresolved_selection_is_error() {
        let result = MemoryHost::from_json(json!({
            "document": { "id": "0:0", "type": "DOCUMENT" },
            "selection": ["missing"]
        }));
        assert!(matches!(result, Err(HostError::NodeNotFound(_))));
    }

    #[tokio::test]
    async fn test_export_image() {
        let host = sample_host();
        let bytes = host
            .export_image("1:1", &ExportSettings::default())
            .await
            .unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);

        let missing = host.export_image("nope", &ExportSettings::default()).await;
        assert!(missing.is_err());
    }

    #[test]
    fn test_notifications_recorded() {
        let host = sample_host();
        host.notify("Skipped 1 oversized element");
        assert_eq!(host.notifications(), vec!["Skipped 1 oversized element"]);
    }
}
