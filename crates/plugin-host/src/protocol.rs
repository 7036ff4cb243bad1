//! Messages exchanged between the UI and the plugin logic

use selection_engine::{SelectionRequest, SkippedNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request from the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PluginRequest {
    GetSelectionInfo(SelectionRequest),
    #[serde(rename_all = "camelCase")]
    ExportElementsAsImages { node_ids: Vec<String> },
    GetLayersList,
    #[serde(rename_all = "camelCase")]
    GetLayerSelectionInfo {
        layer_id: String,
        #[serde(default)]
        include_children: bool,
        #[serde(default)]
        include_images: bool,
    },
    CollectPageData,
    CollectDesignTokens,
    /// Generate from the current selection
    #[serde(rename_all = "camelCase")]
    Generate {
        prompt: String,
        #[serde(default)]
        selection: SelectionRequest,
    },
    /// One generation per prompt over the same selection
    #[serde(rename_all = "camelCase")]
    GenerateBatch {
        prompts: Vec<String>,
        #[serde(default)]
        selection: SelectionRequest,
    },
    /// Structured report over the current selection
    #[serde(rename_all = "camelCase")]
    Research {
        prompt: String,
        #[serde(default)]
        selection: SelectionRequest,
    },
}

impl PluginRequest {
    /// Wire name of the request type
    pub fn kind(&self) -> &'static str {
        match self {
            PluginRequest::GetSelectionInfo(_) => "get-selection-info",
            PluginRequest::ExportElementsAsImages { .. } => "export-elements-as-images",
            PluginRequest::GetLayersList => "get-layers-list",
            PluginRequest::GetLayerSelectionInfo { .. } => "get-layer-selection-info",
            PluginRequest::CollectPageData => "collect-page-data",
            PluginRequest::CollectDesignTokens => "collect-design-tokens",
            PluginRequest::Generate { .. } => "generate",
            PluginRequest::GenerateBatch { .. } => "generate-batch",
            PluginRequest::Research { .. } => "research",
        }
    }
}

/// A request plus its correlation id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub request: PluginRequest,
}

/// The plugin's answer to one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PluginResponse {
    pub fn new(kind: &str, request_id: Option<String>, data: Value) -> Self {
        Self {
            kind: format!("{}-result", kind),
            request_id,
            data,
            skipped: Vec::new(),
            error: None,
        }
    }

    pub fn failed(kind: &str, request_id: Option<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(kind, request_id, Value::Null)
        }
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn with_skipped(mut self, skipped: Vec<SkippedNode>) -> Self {
        self.skipped = skipped;
        self
    }
}
