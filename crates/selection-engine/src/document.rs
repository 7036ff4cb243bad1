//! Document-wide reads
//!
//! Page-scoped and document-scoped variants of the extraction primitives:
//! the flat layer list, page data with a color histogram, design tokens
//! from named styles, and image export by node id. Every read tolerates
//! per-node host failures; an unreadable node is logged and left out.

use std::collections::HashMap;

use futures_util::future::join_all;
use scene_graph::{ExportSettings, NodeRef, NodeType, SceneHost, SceneNode};
use serde::Serialize;
use uuid::Uuid;

use crate::classifier::Facet;
use crate::config::SelectionConfig;
use crate::export::ImageExporter;
use crate::extract::effects::reduce_effect;
use crate::extract::paint::{reduce_paints, solid_colors};
use crate::extract::text::{read_dimension, read_font_name};
use crate::facets::{Dimension, EffectSummary, FontName, PaintSummary};
use crate::text_content::collect_text_nodes;

/// One entry of the layer list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

/// Visible nodes of the whole document in pre-order. Document and page
/// containers are traversed but not listed; hidden subtrees are skipped.
/// Subtrees below `max_depth` are not listed and the cut is logged.
pub fn get_layers_list(host: &dyn SceneHost, max_depth: Option<usize>) -> Vec<LayerEntry> {
    let mut layers = Vec::new();
    list_layers(host.document().as_ref(), 0, max_depth, &mut layers);
    layers
}

fn list_layers(
    node: &dyn SceneNode,
    depth: usize,
    max_depth: Option<usize>,
    layers: &mut Vec<LayerEntry>,
) {
    match node.visible() {
        Ok(false) => return,
        Ok(true) => {}
        Err(err) => log::debug!("Visibility of '{}' unreadable, listing anyway: {}", node.id(), err),
    }

    let node_type = node.node_type();
    if !matches!(node_type, NodeType::Document | NodeType::Page) {
        layers.push(LayerEntry {
            id: node.id().to_string(),
            name: node.name().to_string(),
            node_type,
        });
    }

    match node.children() {
        Some(Ok(children)) if max_depth.is_some_and(|max| depth >= max) => {
            if !children.is_empty() {
                log::debug!(
                    "Depth cap {} reached at '{}', {} child subtrees not listed",
                    depth,
                    node.id(),
                    children.len()
                );
            }
        }
        Some(Ok(children)) => {
            for child in &children {
                list_layers(child.as_ref(), depth + 1, max_depth, layers);
            }
        }
        Some(Err(err)) => log::warn!("Children of '{}' unreadable: {}", node.id(), err),
        None => {}
    }
}

/// A top-level frame described by page data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text_content: Vec<String>,
    pub fills: Vec<PaintSummary>,
}

/// Occurrences of one solid color
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorCount {
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub frame_count: usize,
    pub top_colors: Vec<ColorCount>,
}

/// Page-wide description
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub name: String,
    pub id: String,
    pub background_color: Option<String>,
    pub children: Vec<FrameData>,
    pub analysis: PageAnalysis,
}

/// Describe the current page
pub fn collect_page_data(host: &dyn SceneHost, config: &SelectionConfig) -> PageData {
    let page = host.current_page();

    let background_color = match page.backgrounds() {
        Some(Ok(backgrounds)) => solid_colors(&backgrounds).first().map(|rgb| rgb.to_hex()),
        Some(Err(err)) => {
            log::warn!("Page background of '{}' unreadable: {}", page.id(), err);
            None
        }
        None => None,
    };

    let top_level = match page.children() {
        Some(Ok(children)) => children,
        Some(Err(err)) => {
            log::warn!("Children of page '{}' unreadable: {}", page.id(), err);
            Vec::new()
        }
        None => Vec::new(),
    };
    let frames: Vec<&NodeRef> = top_level
        .iter()
        .filter(|node| node.node_type().is_frame_like())
        .collect();

    let children = frames
        .iter()
        .take(config.page_frame_limit)
        .map(|frame| describe_frame(frame.as_ref(), config))
        .collect();

    PageData {
        name: page.name().to_string(),
        id: page.id().to_string(),
        background_color,
        children,
        analysis: PageAnalysis {
            frame_count: frames.len(),
            top_colors: top_colors(page.as_ref(), config),
        },
    }
}

fn describe_frame(frame: &dyn SceneNode, config: &SelectionConfig) -> FrameData {
    let (width, height) = match frame.size() {
        Some(Ok(size)) => (Some(size.width), Some(size.height)),
        Some(Err(err)) => {
            log::warn!("Size of frame '{}' unreadable: {}", frame.id(), err);
            (None, None)
        }
        None => (None, None),
    };

    let fills = match frame.fills() {
        Some(Ok(fills)) => reduce_paints(&fills, Facet::Fills, frame.id()).unwrap_or_else(|err| {
            log::warn!("Dropping fills of frame '{}': {}", frame.id(), err);
            Vec::new()
        }),
        Some(Err(err)) => {
            log::warn!("Fills of frame '{}' unreadable: {}", frame.id(), err);
            Vec::new()
        }
        None => Vec::new(),
    };

    FrameData {
        id: frame.id().to_string(),
        name: frame.name().to_string(),
        node_type: frame.node_type(),
        width,
        height,
        text_content: collect_text_nodes(frame, config.page_text_limit, config.max_depth),
        fills,
    }
}

/// Most used solid fill colors under `page`, by count then by hex
fn top_colors(page: &dyn SceneNode, config: &SelectionConfig) -> Vec<ColorCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    count_colors(page, 0, config.max_depth, &mut counts);

    let mut ranked: Vec<ColorCount> = counts
        .into_iter()
        .map(|(color, count)| ColorCount { color, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.color.cmp(&b.color)));
    ranked.truncate(config.top_color_limit);
    ranked
}

fn count_colors(
    node: &dyn SceneNode,
    depth: usize,
    max_depth: Option<usize>,
    counts: &mut HashMap<String, usize>,
) {
    if matches!(node.visible(), Ok(false)) {
        return;
    }
    if let Some(Ok(fills)) = node.fills() {
        for color in solid_colors(&fills) {
            *counts.entry(color.to_hex()).or_default() += 1;
        }
    }
    if max_depth.is_some_and(|max| depth >= max) {
        return;
    }
    if let Some(Ok(children)) = node.children() {
        for child in &children {
            count_colors(child.as_ref(), depth + 1, max_depth, counts);
        }
    }
}

/// A named paint style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorToken {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub paints: Vec<PaintSummary>,
}

/// A named text style
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToken {
    pub id: String,
    pub name: String,
    pub font_size: Option<f64>,
    pub font_name: FontName,
    pub letter_spacing: Dimension,
    pub line_height: Dimension,
}

/// A named effect style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectToken {
    pub id: String,
    pub name: String,
    pub effects: Vec<EffectSummary>,
}

/// Reusable named styles of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DesignTokens {
    pub colors: Vec<ColorToken>,
    pub texts: Vec<TextToken>,
    pub effects: Vec<EffectToken>,
}

/// Enumerate the document's named styles. A style group the host fails
/// to enumerate comes back empty.
pub fn collect_design_tokens(host: &dyn SceneHost) -> DesignTokens {
    let colors = match host.paint_styles() {
        Ok(styles) => styles
            .into_iter()
            .map(|style| {
                let paints = reduce_paints(&style.paints, Facet::Fills, &style.id)
                    .unwrap_or_else(|err| {
                        log::warn!("Paint style '{}' malformed: {}", style.name, err);
                        Vec::new()
                    });
                ColorToken {
                    color: solid_colors(&style.paints).first().map(|rgb| rgb.to_hex()),
                    id: style.id,
                    name: style.name,
                    paints,
                }
            })
            .collect(),
        Err(err) => {
            log::warn!("Paint styles unavailable: {}", err);
            Vec::new()
        }
    };

    let texts = match host.text_styles() {
        Ok(styles) => styles
            .into_iter()
            .map(|style| TextToken {
                font_size: style.font_size.as_f64(),
                font_name: read_font_name(&style.font_name),
                letter_spacing: read_dimension(&style.letter_spacing),
                line_height: read_dimension(&style.line_height),
                id: style.id,
                name: style.name,
            })
            .collect(),
        Err(err) => {
            log::warn!("Text styles unavailable: {}", err);
            Vec::new()
        }
    };

    let effects = match host.effect_styles() {
        Ok(styles) => styles
            .into_iter()
            .map(|style| EffectToken {
                effects: style
                    .effects
                    .as_array()
                    .unwrap_or_default()
                    .iter()
                    .map(reduce_effect)
                    .collect(),
                id: style.id,
                name: style.name,
            })
            .collect(),
        Err(err) => {
            log::warn!("Effect styles unavailable: {}", err);
            Vec::new()
        }
    };

    DesignTokens {
        colors,
        texts,
        effects,
    }
}

/// An element exported by id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedElement {
    pub id: String,
    pub name: String,
    pub data: String,
    pub node_id: String,
}

/// Export the given nodes concurrently. Unknown ids and failed exports
/// are left out; the rest keep the order of `node_ids`.
pub async fn export_elements_as_images(
    host: &dyn SceneHost,
    node_ids: &[String],
    settings: ExportSettings,
) -> Vec<ExportedElement> {
    let nodes: Vec<NodeRef> = node_ids
        .iter()
        .filter_map(|id| {
            let node = host.node_by_id(id);
            if node.is_none() {
                log::warn!("Cannot export unknown node '{}'", id);
            }
            node
        })
        .collect();

    let exporter = ImageExporter::new(host, settings);
    let exported = join_all(nodes.iter().map(|node| exporter.export_as_image(node.as_ref()))).await;

    nodes
        .iter()
        .zip(exported)
        .filter_map(|(node, data)| {
            Some(ExportedElement {
                id: Uuid::new_v4().to_string(),
                name: node.name().to_string(),
                data: data?,
                node_id: node.id().to_string(),
            })
        })
        .collect()
}
