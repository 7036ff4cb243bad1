//! Text extraction

use scene_graph::{HostValue, SceneNode};

use super::require;
use crate::classifier::Facet;
use crate::error::ExtractError;
use crate::facets::{Dimension, FacetValue, FontName, TextFacet};

/// `{family, style}` when the host gives a structured font name
pub fn read_font_name(value: &HostValue) -> FontName {
    let family = value.get("family").and_then(HostValue::as_str);
    let style = value.get("style").and_then(HostValue::as_str);
    match (family, style) {
        (Some(family), Some(style)) => FontName {
            family: family.to_string(),
            style: style.to_string(),
        },
        _ => FontName::default(),
    }
}

/// `{value, unit}` when both parts are present, otherwise the raw value
pub fn read_dimension(value: &HostValue) -> Dimension {
    let number = value.get("value").and_then(HostValue::as_f64);
    let unit = value.get("unit").and_then(HostValue::as_str);
    match (number, unit) {
        (Some(value), Some(unit)) => Dimension::Measured {
            value,
            unit: unit.to_string(),
        },
        _ => Dimension::Raw(value.clone()),
    }
}

pub fn extract_text(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let text = require(node.text(), Facet::Text, node)?;
    Ok(FacetValue::Text(TextFacet {
        font_name: read_font_name(&text.font_name),
        letter_spacing: read_dimension(&text.letter_spacing),
        line_height: read_dimension(&text.line_height),
        characters: text.characters,
        font_size: text.font_size,
        paragraph_spacing: text.paragraph_spacing,
        paragraph_indent: text.paragraph_indent,
        text_case: text.text_case,
        text_decoration: text.text_decoration,
        text_align_horizontal: text.text_align_horizontal,
        text_align_vertical: text.text_align_vertical,
        text_auto_resize: text.text_auto_resize,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::{MemoryHost, SceneHost};
    use serde_json::json;

    #[test]
    fn test_font_name_defaults_to_unknown() {
        assert_eq!(read_font_name(&HostValue::Mixed), FontName::default());
        assert_eq!(
            read_font_name(&HostValue::from(json!({ "family": "Inter" }))),
            FontName::default()
        );

        let font = read_font_name(&HostValue::from(json!({ "family": "Inter", "style": "Bold" })));
        assert_eq!(font.family, "Inter");
        assert_eq!(font.style, "Bold");
    }

    #[test]
    fn test_dimension_passthrough() {
        let auto = HostValue::from(json!({ "unit": "AUTO" }));
        assert_eq!(read_dimension(&auto), Dimension::Raw(auto.clone()));
        assert_eq!(
            read_dimension(&HostValue::from(json!({ "value": 120, "unit": "PERCENT" }))),
            Dimension::Measured {
                value: 120.0,
                unit: "PERCENT".to_string()
            }
        );
    }

    #[test]
    fn test_extract_text_facet() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Heading", "type": "TEXT",
            "text": {
                "characters": "Hello",
                "fontSize": 24,
                "fontName": { "family": "Inter", "style": "Regular" },
                "letterSpacing": { "value": 0, "unit": "PIXELS" },
                "lineHeight": { "unit": "AUTO" },
                "textAlignHorizontal": "CENTER",
                "textAutoResize": "WIDTH_AND_HEIGHT"
            }
        }]))
        .unwrap();
        let node = host.node_by_id("1:1").unwrap();

        let FacetValue::Text(text) = extract_text(node.as_ref()).unwrap() else {
            panic!("expected text facet");
        };
        assert_eq!(text.characters, "Hello");
        assert_eq!(text.font_size, HostValue::Number(24.0));
        assert_eq!(text.font_name.family, "Inter");
        assert!(matches!(text.letter_spacing, Dimension::Measured { .. }));
        assert!(matches!(text.line_height, Dimension::Raw(_)));
        assert_eq!(text.text_align_horizontal, HostValue::from("CENTER"));
    }

    #[test]
    fn test_mixed_font_size_passes_through() {
        let host = MemoryHost::with_selection(json!([{
            "id": "1:1", "name": "Rich", "type": "TEXT",
            "text": { "characters": "a b", "fontSize": { "$hostSymbol": "mixed" } }
        }]))
        .unwrap();
        let node = host.node_by_id("1:1").unwrap();

        let FacetValue::Text(text) = extract_text(node.as_ref()).unwrap() else {
            panic!("expected text facet");
        };
        assert!(text.font_size.is_mixed());
    }
}
