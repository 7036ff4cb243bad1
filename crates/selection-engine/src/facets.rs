//! Serialization-safe facet records
//!
//! Each facet extractor produces one of these records. They only hold
//! strings, numbers, booleans, nested records and `HostValue` passthroughs;
//! a `HostValue::Mixed` left in a passthrough slot is nulled by the
//! serialization guard.

use std::collections::BTreeMap;

use scene_graph::{HostValue, NodeType, Rect, SceneNode};
use serde::Serialize;

use crate::error::ExtractError;

/// Identity of a node; the minimal unit of output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl NodeSummary {
    /// Read the full summary. Fails when the host throws on `visible`.
    pub fn read(node: &dyn SceneNode) -> Result<Self, ExtractError> {
        Ok(Self {
            visible: Some(node.visible()?),
            ..Self::minimal(node)
        })
    }

    /// `{id, name, type}` only; never touches fallible properties
    pub fn minimal(node: &dyn SceneNode) -> Self {
        Self {
            id: node.id().to_string(),
            name: node.name().to_string(),
            node_type: node.node_type(),
            visible: None,
        }
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Convert host channels in `0.0..=1.0`
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        fn channel(value: f64) -> u8 {
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A fill or stroke paint reduced to its essentials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintSummary {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl PaintSummary {
    pub fn solid(color: Rgb, opacity: f64) -> Self {
        Self {
            kind: "SOLID".to_string(),
            color: Some(color),
            opacity: Some(opacity),
        }
    }

    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            color: None,
            opacity: None,
        }
    }

    pub fn unknown() -> Self {
        Self::of_kind("unknown")
    }
}

/// Font family and style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl Default for FontName {
    fn default() -> Self {
        Self {
            family: "unknown".to_string(),
            style: "unknown".to_string(),
        }
    }
}

/// A `{value, unit}` measurement, or the host value as-is
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Dimension {
    Measured { value: f64, unit: String },
    Raw(HostValue),
}

/// Text content and typography
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFacet {
    pub characters: String,
    pub font_size: HostValue,
    pub font_name: FontName,
    pub letter_spacing: Dimension,
    pub line_height: Dimension,
    pub paragraph_spacing: HostValue,
    pub paragraph_indent: HostValue,
    pub text_case: HostValue,
    pub text_decoration: HostValue,
    pub text_align_horizontal: HostValue,
    pub text_align_vertical: HostValue,
    pub text_auto_resize: HostValue,
}

/// Padding on each side of an auto-layout frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Auto-layout of a frame-like node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutFacet {
    pub layout_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub primary_axis_align_items: String,
    pub counter_axis_align_items: String,
    pub padding: Padding,
    pub item_spacing: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_wrap: Option<String>,
}

/// Stroke paints plus weight and alignment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeFacet {
    pub paints: Vec<PaintSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<HostValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_align: Option<String>,
}

/// Drop shadow / blur offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// An effect reduced to its essentials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSummary {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
}

/// The component an instance resolves to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// A primitive component property value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentPropertyValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: HostValue,
}

/// Component binding of an instance node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentFacet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_component: Option<ComponentSummary>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_properties: BTreeMap<String, ComponentPropertyValue>,
}

/// Opacity, blending and shape clipping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceFacet {
    pub opacity: f64,
    pub blend_mode: String,
    #[serde(skip_serializing_if = "HostValue::is_null")]
    pub corner_radius: HostValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips_content: Option<bool>,
}

/// Vector-shape geometry summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorFacet {
    #[serde(skip_serializing_if = "HostValue::is_null")]
    pub corner_radius: HostValue,
    pub path_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_operation: Option<String>,
}

/// Styles attached only by the detailed walker variant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedStyles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strokes: Option<StrokeFacet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<EffectSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<AppearanceFacet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<VectorFacet>,
}

impl DetailedStyles {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_none()
            && self.effects.is_none()
            && self.appearance.is_none()
            && self.vector.is_none()
    }
}

/// Output of a single facet extractor
#[derive(Debug, Clone, PartialEq)]
pub enum FacetValue {
    Fills(Vec<PaintSummary>),
    Strokes(StrokeFacet),
    Effects(Vec<EffectSummary>),
    Text(TextFacet),
    Layout(LayoutFacet),
    Component(ComponentFacet),
    Vector(VectorFacet),
    Appearance(AppearanceFacet),
}

/// Optional attribute groups attached to a node summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFacets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<PaintSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextFacet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutFacet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentFacet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_styles: Option<DetailedStyles>,
}

impl ExtractedFacets {
    /// Slot an extractor result into its group
    pub fn insert(&mut self, value: FacetValue) {
        match value {
            FacetValue::Fills(paints) => self.fills = Some(paints),
            FacetValue::Text(text) => self.text = Some(text),
            FacetValue::Layout(layout) => self.layout = Some(layout),
            FacetValue::Component(component) => self.component = Some(component),
            FacetValue::Strokes(strokes) => self.detailed_mut().strokes = Some(strokes),
            FacetValue::Effects(effects) => self.detailed_mut().effects = Some(effects),
            FacetValue::Appearance(appearance) => {
                self.detailed_mut().appearance = Some(appearance)
            }
            FacetValue::Vector(vector) => self.detailed_mut().vector = Some(vector),
        }
    }

    fn detailed_mut(&mut self) -> &mut DetailedStyles {
        self.detailed_styles.get_or_insert_with(DetailedStyles::default)
    }
}

impl FromIterator<FacetValue> for ExtractedFacets {
    fn from_iter<I: IntoIterator<Item = FacetValue>>(iter: I) -> Self {
        let mut facets = ExtractedFacets::default();
        for value in iter {
            facets.insert(value);
        }
        facets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rgb_from_unit_rounds_and_clamps() {
        assert_eq!(Rgb::from_unit(1.0, 0.0, 0.5), Rgb { r: 255, g: 0, b: 128 });
        assert_eq!(Rgb::from_unit(1.5, -0.2, 0.0), Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(Rgb::from_unit(1.0, 0.0, 0.0).to_hex(), "#ff0000");
    }

    #[test]
    fn test_paint_summary_shapes() {
        let solid = serde_json::to_value(PaintSummary::solid(Rgb { r: 255, g: 0, b: 0 }, 1.0))
            .unwrap();
        assert_eq!(
            solid,
            json!({ "type": "SOLID", "color": { "r": 255, "g": 0, "b": 0 }, "opacity": 1.0 })
        );

        let gradient = serde_json::to_value(PaintSummary::of_kind("GRADIENT_LINEAR")).unwrap();
        assert_eq!(gradient, json!({ "type": "GRADIENT_LINEAR" }));
    }

    #[test]
    fn test_dimension_serializes_untagged() {
        let measured = Dimension::Measured {
            value: 1.5,
            unit: "PIXELS".to_string(),
        };
        assert_eq!(
            serde_json::to_value(measured).unwrap(),
            json!({ "value": 1.5, "unit": "PIXELS" })
        );
        let raw = Dimension::Raw(HostValue::from("AUTO"));
        assert_eq!(serde_json::to_value(raw).unwrap(), json!("AUTO"));
    }

    #[test]
    fn test_detail_facets_go_to_detailed_styles() {
        let facets: ExtractedFacets = vec![
            FacetValue::Fills(vec![PaintSummary::unknown()]),
            FacetValue::Effects(vec![]),
        ]
        .into_iter()
        .collect();

        assert!(facets.fills.is_some());
        let detailed = facets.detailed_styles.unwrap();
        assert_eq!(detailed.effects, Some(vec![]));
        assert!(detailed.strokes.is_none());
    }
}
