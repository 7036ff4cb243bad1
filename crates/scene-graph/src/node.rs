//! Scene node abstraction
//!
//! A `SceneNode` always answers for its identity (`id`, `name`, `node_type`).
//! Every other attribute group is a capability probe: the default
//! implementation returns `None`, so a node kind only exposes the facets it
//! actually implements and new kinds need no changes downstream.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::HostValue;

/// Shared handle to a node owned by the host
pub type NodeRef = Arc<dyn SceneNode>;

/// Outcome of probing an optional capability.
///
/// - `None`: the node does not expose the capability
/// - `Some(Err(_))`: the capability exists but the host threw on access
/// - `Some(Ok(_))`: the value
pub type Probe<T> = Option<Result<T>>;

/// Node kinds reported by the host.
///
/// Serialized as the host's own tag. Tags this build does not name are kept
/// verbatim in `Other` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Document,
    Page,
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Rectangle,
    Ellipse,
    Polygon,
    Star,
    Line,
    Vector,
    BooleanOperation,
    Text,
    Slice,
    Media,
    /// Any other host tag, e.g. `STICKY` or `CONNECTOR`
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Document => "DOCUMENT",
            NodeType::Page => "PAGE",
            NodeType::Frame => "FRAME",
            NodeType::Group => "GROUP",
            NodeType::Section => "SECTION",
            NodeType::Component => "COMPONENT",
            NodeType::ComponentSet => "COMPONENT_SET",
            NodeType::Instance => "INSTANCE",
            NodeType::Rectangle => "RECTANGLE",
            NodeType::Ellipse => "ELLIPSE",
            NodeType::Polygon => "POLYGON",
            NodeType::Star => "STAR",
            NodeType::Line => "LINE",
            NodeType::Vector => "VECTOR",
            NodeType::BooleanOperation => "BOOLEAN_OPERATION",
            NodeType::Text => "TEXT",
            NodeType::Slice => "SLICE",
            NodeType::Media => "MEDIA",
            NodeType::Other(tag) => tag,
        }
    }

    /// Top-level containers counted as "frames" in page analysis
    pub fn is_frame_like(&self) -> bool {
        matches!(
            self,
            NodeType::Frame | NodeType::Component | NodeType::ComponentSet | NodeType::Instance
        )
    }
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        match tag {
            "DOCUMENT" => NodeType::Document,
            "PAGE" => NodeType::Page,
            "FRAME" => NodeType::Frame,
            "GROUP" => NodeType::Group,
            "SECTION" => NodeType::Section,
            "COMPONENT" => NodeType::Component,
            "COMPONENT_SET" => NodeType::ComponentSet,
            "INSTANCE" => NodeType::Instance,
            "RECTANGLE" => NodeType::Rectangle,
            "ELLIPSE" => NodeType::Ellipse,
            "POLYGON" => NodeType::Polygon,
            "STAR" => NodeType::Star,
            "LINE" => NodeType::Line,
            "VECTOR" => NodeType::Vector,
            "BOOLEAN_OPERATION" => NodeType::BooleanOperation,
            "TEXT" => NodeType::Text,
            "SLICE" => NodeType::Slice,
            "MEDIA" => NodeType::Media,
            other => NodeType::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        NodeType::from(tag.as_str())
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned rectangle in absolute document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Width and height of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Raw text properties of a text node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub characters: String,
    pub font_size: HostValue,
    pub font_name: HostValue,
    pub letter_spacing: HostValue,
    pub line_height: HostValue,
    pub paragraph_spacing: HostValue,
    pub paragraph_indent: HostValue,
    pub text_case: HostValue,
    pub text_decoration: HostValue,
    pub text_align_horizontal: HostValue,
    pub text_align_vertical: HostValue,
    pub text_auto_resize: HostValue,
}

/// Auto-layout properties of a frame-like node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutProps {
    pub layout_mode: String,
    pub primary_axis_align_items: String,
    pub counter_axis_align_items: String,
    pub padding_top: f64,
    pub padding_right: f64,
    pub padding_bottom: f64,
    pub padding_left: f64,
    pub item_spacing: f64,
    pub layout_wrap: Option<String>,
}

/// Stroke paints and geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrokeProps {
    pub paints: HostValue,
    pub weight: HostValue,
    pub align: Option<String>,
}

/// Component binding of an instance node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceProps {
    pub component_id: Option<String>,
    pub component_properties: BTreeMap<String, HostValue>,
}

/// Vector-shape geometry summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorProps {
    pub corner_radius: HostValue,
    pub path_count: usize,
    pub boolean_operation: Option<String>,
}

/// Blend and shape properties shared by most visible nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearanceProps {
    pub opacity: f64,
    pub blend_mode: String,
    pub corner_radius: HostValue,
    pub clips_content: Option<bool>,
}

impl Default for AppearanceProps {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            blend_mode: "PASS_THROUGH".to_string(),
            corner_radius: HostValue::Null,
            clips_content: None,
        }
    }
}

/// One element of the host's scene graph.
///
/// Implementations are read-only views; the plugin never mutates the
/// document through this trait.
pub trait SceneNode: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn node_type(&self) -> NodeType;

    /// Visibility flag. Some hosts throw here for exotic node combinations.
    fn visible(&self) -> Result<bool>;

    fn size(&self) -> Probe<Size> {
        None
    }

    fn absolute_bounding_box(&self) -> Probe<Rect> {
        None
    }

    /// Fill paints: an array of paint objects, or `Mixed`
    fn fills(&self) -> Probe<HostValue> {
        None
    }

    fn strokes(&self) -> Probe<StrokeProps> {
        None
    }

    /// Effects: an array of effect objects
    fn effects(&self) -> Probe<HostValue> {
        None
    }

    fn text(&self) -> Probe<TextProps> {
        None
    }

    fn layout(&self) -> Probe<LayoutProps> {
        None
    }

    fn instance(&self) -> Probe<InstanceProps> {
        None
    }

    /// The component an instance is bound to, when the reference resolves
    fn main_component(&self) -> Probe<NodeRef> {
        None
    }

    fn vector(&self) -> Probe<VectorProps> {
        None
    }

    fn appearance(&self) -> Probe<AppearanceProps> {
        None
    }

    /// Page background paints
    fn backgrounds(&self) -> Probe<HostValue> {
        None
    }

    /// Direct children in the host's native order
    fn children(&self) -> Probe<Vec<NodeRef>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Bare;

    impl SceneNode for Bare {
        fn id(&self) -> &str {
            "0:1"
        }

        fn name(&self) -> &str {
            "Bare"
        }

        fn node_type(&self) -> NodeType {
            NodeType::Other("STICKY".to_string())
        }

        fn visible(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_default_probes_are_absent() {
        let node = Bare;
        assert!(node.fills().is_none());
        assert!(node.text().is_none());
        assert!(node.children().is_none());
        assert!(node.main_component().is_none());
    }

    #[test]
    fn test_node_type_serde() {
        let encoded = serde_json::to_value(NodeType::BooleanOperation).unwrap();
        assert_eq!(encoded, "BOOLEAN_OPERATION");

        let decoded: NodeType = serde_json::from_value(serde_json::json!("FRAME")).unwrap();
        assert_eq!(decoded, NodeType::Frame);
        assert_eq!(NodeType::ComponentSet.to_string(), "COMPONENT_SET");
    }

    #[test]
    fn test_unlisted_node_type_keeps_host_tag() {
        for tag in ["STICKY", "CONNECTOR", "SHAPE_WITH_TEXT", "TABLE"] {
            let decoded: NodeType = serde_json::from_value(serde_json::json!(tag)).unwrap();
            assert_eq!(decoded, NodeType::Other(tag.to_string()));
            assert_eq!(decoded.as_str(), tag);
            assert_eq!(decoded.to_string(), tag);
            assert_eq!(serde_json::to_value(&decoded).unwrap(), tag);
        }
        assert!(!NodeType::from("CONNECTOR").is_frame_like());
    }
}
