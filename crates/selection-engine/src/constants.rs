//! Engine-wide constants
//!
//! Single source of truth for the limits applied while serializing a
//! selection.

/// Traversal and filtering limits
pub mod limits {
    /// Children enumerated per node before the list is truncated
    pub const MAX_FANOUT: usize = 10;
    /// Nodes wider or taller than this are dropped from a selection batch
    pub const MAX_DIMENSION: f64 = 10_000.0;
    /// Recursion stops below this depth
    pub const MAX_DEPTH: usize = 64;
}

/// Page-wide analysis limits
pub mod page {
    /// Top-level frames described in page data
    pub const FRAME_LIMIT: usize = 10;
    /// Text nodes collected per frame
    pub const TEXT_LIMIT: usize = 20;
    /// Entries in the color histogram
    pub const TOP_COLOR_LIMIT: usize = 10;
}

/// Raster export
pub mod image {
    /// Default export scale
    pub const EXPORT_SCALE: f64 = 1.0;
    /// Prefix every exported image data URI starts with
    pub const DATA_URI_PREFIX: &str = "data:image";
    /// Keys whose data URI values pass the serialization guard verbatim
    pub const DATA_KEYS: &[&str] = &["imageData", "data"];
}
