//! Image exporter
//!
//! Raster encoding is delegated to the host. Every export is isolated: a
//! failed node yields `None` and the rest of the batch carries on. Batches
//! start every export before awaiting any of them, and results are matched
//! back by position.

use base64::Engine as _;
use futures_util::future::join_all;
use scene_graph::{ExportSettings, HostValue, ImageFormat, NodeRef, NodeType, SceneHost, SceneNode};
use serde::Serialize;

/// Why a node counts as a visual image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageReason {
    /// Carries an `IMAGE` paint in its fills
    ImageFill,
    /// Is a media node itself
    MediaNode,
}

/// A node found by `find_image_nodes_in_layer`
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub node: NodeRef,
    pub reason: ImageReason,
}

/// One exported image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImage {
    pub node_id: String,
    pub name: String,
    pub image_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ImageReason>,
}

/// Encode raster bytes as a data URI
pub fn to_data_uri(bytes: &[u8], format: ImageFormat) -> String {
    format!(
        "data:{};base64,{}",
        format.mime_type(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn image_reason(node: &dyn SceneNode) -> Option<ImageReason> {
    if node.node_type() == NodeType::Media {
        return Some(ImageReason::MediaNode);
    }
    let fills = match node.fills() {
        Some(Ok(fills)) => fills,
        Some(Err(err)) => {
            log::debug!("Fills of '{}' unreadable during image search: {}", node.id(), err);
            return None;
        }
        None => return None,
    };
    fills
        .as_array()
        .unwrap_or_default()
        .iter()
        .any(|paint| paint.get("type").and_then(HostValue::as_str) == Some("IMAGE"))
        .then_some(ImageReason::ImageFill)
}

/// Visible nodes in the subtree (root included) that are visually images,
/// in depth-first pre-order.
pub fn find_image_nodes_in_layer(node: &NodeRef) -> Vec<ImageCandidate> {
    if matches!(node.visible(), Ok(false)) {
        return Vec::new();
    }

    let mut found = Vec::new();
    if let Some(reason) = image_reason(node.as_ref()) {
        found.push(ImageCandidate {
            node: NodeRef::clone(node),
            reason,
        });
    }
    if let Some(Ok(children)) = node.children() {
        for child in &children {
            found.extend(find_image_nodes_in_layer(child));
        }
    }
    found
}

/// Exports nodes through the host encoder
pub struct ImageExporter<'h> {
    host: &'h dyn SceneHost,
    settings: ExportSettings,
}

impl<'h> ImageExporter<'h> {
    pub fn new(host: &'h dyn SceneHost, settings: ExportSettings) -> Self {
        Self { host, settings }
    }

    /// Export one node as a data URI; `None` on failure
    pub async fn export_as_image(&self, node: &dyn SceneNode) -> Option<String> {
        match self.host.export_image(node.id(), &self.settings).await {
            Ok(bytes) => Some(to_data_uri(&bytes, self.settings.format)),
            Err(err) => {
                log::warn!("Image export failed for '{}': {}", node.id(), err);
                None
            }
        }
    }

    /// Export many nodes concurrently; the result at `i` belongs to `nodes[i]`
    pub async fn export_batch(&self, nodes: &[NodeRef]) -> Vec<Option<String>> {
        join_all(nodes.iter().map(|node| self.export_as_image(node.as_ref()))).await
    }

    /// Export the image sub-elements of a layer, or the whole layer when it
    /// has none.
    pub async fn export_layer_images(&self, layer: &NodeRef) -> Vec<ExportedImage> {
        let candidates = find_image_nodes_in_layer(layer);
        if candidates.is_empty() {
            return self
                .export_as_image(layer.as_ref())
                .await
                .map(|image_data| ExportedImage {
                    node_id: layer.id().to_string(),
                    name: layer.name().to_string(),
                    image_data,
                    reason: None,
                })
                .into_iter()
                .collect();
        }

        let nodes: Vec<NodeRef> = candidates.iter().map(|c| NodeRef::clone(&c.node)).collect();
        let exported = self.export_batch(&nodes).await;
        candidates
            .into_iter()
            .zip(exported)
            .filter_map(|(candidate, image_data)| {
                Some(ExportedImage {
                    node_id: candidate.node.id().to_string(),
                    name: candidate.node.name().to_string(),
                    image_data: image_data?,
                    reason: Some(candidate.reason),
                })
            })
            .collect()
    }
}
