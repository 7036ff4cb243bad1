//! Document-wide host capabilities

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::NodeRef;
use crate::value::HostValue;

/// Raster format requested from the host encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
}

impl ImageFormat {
    /// MIME type used in data URIs
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpg => "image/jpeg",
        }
    }
}

/// Raster export settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub format: ImageFormat,
    pub scale: f64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            scale: 1.0,
        }
    }
}

/// A named reusable paint style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaintStyle {
    pub id: String,
    pub name: String,
    pub paints: HostValue,
}

/// A named reusable text style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub id: String,
    pub name: String,
    pub font_size: HostValue,
    pub font_name: HostValue,
    pub letter_spacing: HostValue,
    pub line_height: HostValue,
}

/// A named reusable effect style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectStyle {
    pub id: String,
    pub name: String,
    pub effects: HostValue,
}

/// Access to the host document as a whole.
///
/// Calls into the host are synchronous except raster export, which the
/// host performs asynchronously.
#[async_trait]
pub trait SceneHost: Send + Sync {
    /// Current selection in the host's order
    fn selection(&self) -> Vec<NodeRef>;

    /// The page the user is looking at
    fn current_page(&self) -> NodeRef;

    /// The document root
    fn document(&self) -> NodeRef;

    /// Resolve a node anywhere in the document
    fn node_by_id(&self, id: &str) -> Option<NodeRef>;

    /// Show a transient message to the user
    fn notify(&self, message: &str);

    /// Encode a node as raster image bytes
    async fn export_image(&self, node_id: &str, settings: &ExportSettings) -> Result<Vec<u8>>;

    fn paint_styles(&self) -> Result<Vec<PaintStyle>>;

    fn text_styles(&self) -> Result<Vec<TextStyle>>;

    fn effect_styles(&self) -> Result<Vec<EffectStyle>>;
}
