//! Configuration for selection serialization

use serde::{Deserialize, Serialize};

use crate::constants::{image, limits, page};

/// Limits applied by the engine.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    /// Children enumerated per node during a hierarchy walk
    pub max_fanout: usize,
    /// Width/height above which a selected node is skipped
    pub max_dimension: f64,
    /// Recursion depth cap (`None` = unbounded)
    pub max_depth: Option<usize>,
    /// Raster export scale
    pub export_scale: f64,
    /// Top-level frames described by page data
    pub page_frame_limit: usize,
    /// Text nodes collected per frame in page data
    pub page_text_limit: usize,
    /// Entries kept in the page color histogram
    pub top_color_limit: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_fanout: limits::MAX_FANOUT,
            max_dimension: limits::MAX_DIMENSION,
            max_depth: Some(limits::MAX_DEPTH),
            export_scale: image::EXPORT_SCALE,
            page_frame_limit: page::FRAME_LIMIT,
            page_text_limit: page::TEXT_LIMIT,
            top_color_limit: page::TOP_COLOR_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SelectionConfig::default();
        assert_eq!(config.max_fanout, 10);
        assert_eq!(config.max_dimension, 10_000.0);
        assert_eq!(config.max_depth, Some(64));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SelectionConfig =
            serde_json::from_value(serde_json::json!({ "maxFanout": 3 })).unwrap();
        assert_eq!(config.max_fanout, 3);
        assert_eq!(config.page_text_limit, 20);
    }
}
