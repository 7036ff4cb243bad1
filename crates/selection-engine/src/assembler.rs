//! Selection info assembler
//!
//! Runs the selection pipeline as an explicit state machine:
//!
//! ```text
//! Start -> Filtered -> BasicInfoExtracted -> [TextAggregated]
//!       -> [HierarchyWalked] -> [ImagesExported] -> Sanitized
//! ```
//!
//! Optional stages run according to the request. Each stage works on a copy
//! of the current batch. A node the stage cannot handle is degraded in place
//! and recorded; the stage fails as a whole only when no node made it
//! through. On a whole-stage failure the pipeline stops and the last good
//! batch is sanitized and returned along with the failure. If the guard itself fails, the output
//! drops to `{id, name, type}` triples. Nothing here returns an error to
//! the caller.

use std::fmt;

use scene_graph::{ExportSettings, ImageFormat, NodeRef, SceneHost};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::SelectionConfig;
use crate::error::{ExtractError, StageError};
use crate::export::{ExportedImage, ImageExporter};
use crate::extract::FacetRegistry;
use crate::facets::{ExtractedFacets, NodeSummary};
use crate::filter::{filter_selection, SkippedNode};
use crate::guard::sanitize;
use crate::text_content::{collect_text_tree, TextTree};
use crate::walker::{HierarchyNode, StyleDetail, TreeWalker, WalkOptions};

/// Caller-selected generation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    #[default]
    Webdesign,
    Presentation,
    Diagram,
    Wireframe,
    Coding,
    Research,
}

impl TemplateType {
    pub fn style_detail(&self) -> StyleDetail {
        match self {
            TemplateType::Coding => StyleDetail::Detailed,
            _ => StyleDetail::Light,
        }
    }

    pub fn aggregates_text(&self) -> bool {
        matches!(self, TemplateType::Research)
    }
}

/// Flags of a selection info request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionRequest {
    pub include_children: bool,
    pub include_images: bool,
    pub template_type: TemplateType,
}

/// Serialized description of one selected node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    #[serde(flatten)]
    pub summary: NodeSummary,
    #[serde(flatten)]
    pub facets: ExtractedFacets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<HierarchyNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_elements: Option<Vec<ExportedImage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_text_content: Option<TextTree>,
}

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Filtered,
    BasicInfoExtracted,
    TextAggregated,
    HierarchyWalked,
    ImagesExported,
    Sanitized,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Filtered => "filtered",
            Stage::BasicInfoExtracted => "basic_info_extracted",
            Stage::TextAggregated => "text_aggregated",
            Stage::HierarchyWalked => "hierarchy_walked",
            Stage::ImagesExported => "images_exported",
            Stage::Sanitized => "sanitized",
        }
    }

    /// The data stage that follows `self` for this request, if any.
    /// `None` means the batch is ready for the guard.
    pub fn successor(self, request: &SelectionRequest) -> Option<Stage> {
        let after_hierarchy = || request.include_images.then_some(Stage::ImagesExported);
        let after_text = || {
            if request.include_children {
                Some(Stage::HierarchyWalked)
            } else {
                after_hierarchy()
            }
        };

        match self {
            Stage::Start => Some(Stage::Filtered),
            Stage::Filtered => Some(Stage::BasicInfoExtracted),
            Stage::BasicInfoExtracted if request.template_type.aggregates_text() => {
                Some(Stage::TextAggregated)
            }
            Stage::BasicInfoExtracted | Stage::TextAggregated => after_text(),
            Stage::HierarchyWalked => after_hierarchy(),
            Stage::ImagesExported | Stage::Sanitized => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage that did not complete
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageFailure {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
}

impl From<&StageError> for StageFailure {
    fn from(err: &StageError) -> Self {
        Self {
            stage: err.stage,
            node_id: Some(err.node_id.clone()),
            message: err.to_string(),
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyOutcome {
    /// Sanitized batch, always a JSON array
    pub selection: Value,
    /// Last stage that completed
    pub completed: Stage,
    /// Whole-stage failure that stopped the pipeline
    pub failure: Option<StageFailure>,
    /// Nodes degraded by a stage that otherwise completed
    pub degraded: Vec<StageFailure>,
    pub skipped: Vec<SkippedNode>,
}

impl AssemblyOutcome {
    /// Message for the response `error` field
    pub fn error(&self) -> Option<String> {
        let messages: Vec<&str> = self
            .failure
            .iter()
            .chain(&self.degraded)
            .map(|failure| failure.message.as_str())
            .collect();
        (!messages.is_empty()).then(|| messages.join("; "))
    }

    /// Sanitized entries of the batch
    pub fn entries(&self) -> &[Value] {
        self.selection.as_array().map(Vec::as_slice).unwrap_or_default()
    }
}

/// How the image stage exports a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// One screenshot per selected node
    #[default]
    Snapshot,
    /// The node's image sub-elements, or the whole node when it has none
    LayerElements,
}

/// Runs the selection pipeline against a host
pub struct SelectionAssembler<'a> {
    host: &'a dyn SceneHost,
    registry: &'a FacetRegistry,
    config: &'a SelectionConfig,
    image_mode: ImageMode,
}

impl<'a> SelectionAssembler<'a> {
    pub fn new(
        host: &'a dyn SceneHost,
        registry: &'a FacetRegistry,
        config: &'a SelectionConfig,
    ) -> Self {
        Self {
            host,
            registry,
            config,
            image_mode: ImageMode::Snapshot,
        }
    }

    pub fn with_image_mode(mut self, image_mode: ImageMode) -> Self {
        self.image_mode = image_mode;
        self
    }

    /// Run the pipeline over `nodes`
    pub async fn assemble(&self, nodes: Vec<NodeRef>, request: &SelectionRequest) -> AssemblyOutcome {
        let filtered = filter_selection(self.host, nodes, self.config.max_dimension);
        let kept = filtered.kept;
        let mut completed = Stage::Filtered;
        let mut failure = None;
        let mut degraded = Vec::new();
        let mut batch: Vec<SelectionInfo> = Vec::new();

        while let Some(stage) = completed.successor(request) {
            let mut next = batch.clone();
            match self.run_stage(stage, &kept, &mut next, request).await {
                Ok(node_errors) => {
                    log::debug!(
                        "Stage {} completed for {} node(s), {} degraded",
                        stage,
                        kept.len(),
                        node_errors.len()
                    );
                    degraded.extend(node_errors.iter().map(StageFailure::from));
                    batch = next;
                    completed = stage;
                }
                Err(err) => {
                    log::warn!("Falling back to {} output: {}", completed, err);
                    failure = Some(StageFailure::from(&err));
                    break;
                }
            }
        }

        let selection = match sanitize(&batch) {
            Ok(selection) => {
                if failure.is_none() {
                    completed = Stage::Sanitized;
                }
                selection
            }
            Err(err) => {
                log::error!("Sanitizing selection failed, returning identities only: {}", err);
                failure = Some(StageFailure {
                    stage: Stage::Sanitized,
                    node_id: None,
                    message: err.to_string(),
                });
                identity_triples(&kept)
            }
        };

        AssemblyOutcome {
            selection,
            completed,
            failure,
            degraded,
            skipped: filtered.skipped,
        }
    }

    async fn run_stage(
        &self,
        stage: Stage,
        nodes: &[NodeRef],
        batch: &mut Vec<SelectionInfo>,
        request: &SelectionRequest,
    ) -> Result<Vec<StageError>, StageError> {
        let detail = request.template_type.style_detail();
        match stage {
            Stage::BasicInfoExtracted => {
                *batch = nodes
                    .iter()
                    .map(|node| self.basic_info(node, detail))
                    .collect();
                Ok(Vec::new())
            }
            Stage::TextAggregated => settle(nodes.len(), self.aggregate_text(nodes, batch)),
            Stage::HierarchyWalked => {
                settle(nodes.len(), self.walk_hierarchies(nodes, batch, detail))
            }
            Stage::ImagesExported => {
                self.export_images(nodes, batch).await;
                Ok(Vec::new())
            }
            Stage::Start | Stage::Filtered | Stage::Sanitized => Ok(Vec::new()),
        }
    }

    fn basic_info(&self, node: &NodeRef, detail: StyleDetail) -> SelectionInfo {
        let summary = NodeSummary::read(node.as_ref()).unwrap_or_else(|err| {
            log::warn!("Reducing node '{}' to its identity: {}", node.id(), err);
            NodeSummary::minimal(node.as_ref())
        });
        SelectionInfo {
            summary,
            facets: self.registry.extract_facets(node.as_ref(), detail),
            hierarchy: None,
            image_data: None,
            image_elements: None,
            all_text_content: None,
        }
    }

    /// Attach text trees; a node whose text cannot be read gets none
    fn aggregate_text(&self, nodes: &[NodeRef], batch: &mut [SelectionInfo]) -> Vec<StageError> {
        let mut errors = Vec::new();
        for (node, info) in nodes.iter().zip(batch.iter_mut()) {
            match collect_text_tree(node.as_ref(), self.config.max_depth) {
                Ok(tree) => info.all_text_content = Some(tree),
                Err(source) => errors.push(node_error(Stage::TextAggregated, node, source)),
            }
        }
        errors
    }

    /// Attach hierarchies; a node that cannot be walked gets its identity only
    fn walk_hierarchies(
        &self,
        nodes: &[NodeRef],
        batch: &mut [SelectionInfo],
        detail: StyleDetail,
    ) -> Vec<StageError> {
        let walker = TreeWalker::new(self.registry, WalkOptions::from_config(self.config, detail));
        let mut errors = Vec::new();
        for (node, info) in nodes.iter().zip(batch.iter_mut()) {
            info.hierarchy = Some(match walker.walk(node.as_ref()) {
                Ok(hierarchy) => hierarchy,
                Err(source) => {
                    errors.push(node_error(Stage::HierarchyWalked, node, source));
                    HierarchyNode::minimal(node.as_ref())
                }
            });
        }
        errors
    }

    async fn export_images(&self, nodes: &[NodeRef], batch: &mut [SelectionInfo]) {
        let exporter = ImageExporter::new(
            self.host,
            ExportSettings {
                format: ImageFormat::Png,
                scale: self.config.export_scale,
            },
        );

        match self.image_mode {
            ImageMode::Snapshot => {
                let images = exporter.export_batch(nodes).await;
                for (info, image) in batch.iter_mut().zip(images) {
                    info.image_data = image;
                }
            }
            ImageMode::LayerElements => {
                for (node, info) in nodes.iter().zip(batch.iter_mut()) {
                    let elements = exporter.export_layer_images(node).await;
                    info.image_data = elements
                        .iter()
                        .find(|element| element.reason.is_none())
                        .map(|element| element.image_data.clone());
                    info.image_elements = Some(elements);
                }
            }
        }
    }
}

fn node_error(stage: Stage, node: &NodeRef, source: ExtractError) -> StageError {
    let err = StageError {
        stage,
        node_id: node.id().to_string(),
        source,
    };
    log::warn!("Degrading node '{}': {}", node.id(), err);
    err
}

/// Node errors of a stage. When every node failed the stage itself failed.
fn settle(attempted: usize, mut errors: Vec<StageError>) -> Result<Vec<StageError>, StageError> {
    if attempted > 0 && errors.len() == attempted {
        Err(errors.remove(0))
    } else {
        Ok(errors)
    }
}

/// Last-resort output: `{id, name, type}` for each node
fn identity_triples(nodes: &[NodeRef]) -> Value {
    Value::Array(
        nodes
            .iter()
            .map(|node| {
                json!({
                    "id": node.id(),
                    "name": node.name(),
                    "type": node.node_type(),
                })
            })
            .collect(),
    )
}
