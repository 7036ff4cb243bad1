//! Engine entry points
//!
//! `SelectionEngine` bundles a host, the engine config and a facet registry
//! and exposes one method per plugin operation.

use std::sync::Arc;

use scene_graph::{ExportSettings, ImageFormat, SceneHost};

use crate::assembler::{AssemblyOutcome, ImageMode, SelectionAssembler, SelectionRequest};
use crate::config::SelectionConfig;
use crate::document::{self, DesignTokens, ExportedElement, LayerEntry, PageData};
use crate::error::{EngineError, Result};
use crate::extract::FacetRegistry;

/// Selection serialization over one host document
pub struct SelectionEngine {
    host: Arc<dyn SceneHost>,
    config: SelectionConfig,
    registry: FacetRegistry,
}

impl SelectionEngine {
    pub fn new(host: Arc<dyn SceneHost>, config: SelectionConfig) -> Self {
        Self {
            host,
            config,
            registry: FacetRegistry::standard(),
        }
    }

    /// Replace the facet registry
    pub fn with_registry(mut self, registry: FacetRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn SceneHost> {
        &self.host
    }

    fn assembler(&self) -> SelectionAssembler<'_> {
        SelectionAssembler::new(self.host.as_ref(), &self.registry, &self.config)
    }

    fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            format: ImageFormat::Png,
            scale: self.config.export_scale,
        }
    }

    /// Describe the current selection
    pub async fn get_selection_info(&self, request: &SelectionRequest) -> AssemblyOutcome {
        let selection = self.host.selection();
        log::debug!(
            "Serializing {} selected node(s) as {:?}",
            selection.len(),
            request
        );
        self.assembler().assemble(selection, request).await
    }

    /// Describe one layer, exporting its image sub-elements when images
    /// are requested.
    pub async fn get_layer_selection_info(
        &self,
        layer_id: &str,
        include_children: bool,
        include_images: bool,
    ) -> Result<AssemblyOutcome> {
        let layer = self
            .host
            .node_by_id(layer_id)
            .ok_or_else(|| EngineError::NodeNotFound(layer_id.to_string()))?;

        let request = SelectionRequest {
            include_children,
            include_images,
            ..SelectionRequest::default()
        };
        let outcome = self
            .assembler()
            .with_image_mode(ImageMode::LayerElements)
            .assemble(vec![layer], &request)
            .await;

        if !outcome.skipped.is_empty() {
            return Err(EngineError::Oversized(layer_id.to_string()));
        }
        Ok(outcome)
    }

    /// Export nodes by id as data URIs
    pub async fn export_elements_as_images(&self, node_ids: &[String]) -> Vec<ExportedElement> {
        document::export_elements_as_images(self.host.as_ref(), node_ids, self.export_settings())
            .await
    }

    pub fn get_layers_list(&self) -> Vec<LayerEntry> {
        document::get_layers_list(self.host.as_ref(), self.config.max_depth)
    }

    pub fn collect_page_data(&self) -> PageData {
        document::collect_page_data(self.host.as_ref(), &self.config)
    }

    pub fn collect_design_tokens(&self) -> DesignTokens {
        document::collect_design_tokens(self.host.as_ref())
    }
}
