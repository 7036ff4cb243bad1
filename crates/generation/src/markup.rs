//! Reply post-processing
//!
//! Models wrap markup in prose and code fences. These helpers pull out the
//! part the plugin can insert into the canvas.

use serde::Serialize;

use crate::types::{ContentPart, ReplyContent};

/// What a generation reply turned out to contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum GeneratedOutput {
    /// A standalone `<svg>` document
    Svg(String),
    /// An HTML document or fragment
    Html(String),
    /// A raster image as a data URI
    Image(String),
    /// Anything else, trimmed
    Text(String),
}

/// Find `open..close` (case-insensitive), returning the enclosed slice
/// including both delimiters.
fn find_block<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find(open)?;
    let end = lower[start..].rfind(close)? + start + close.len();
    Some(&text[start..end])
}

/// Strip a surrounding Markdown code fence, if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

pub fn extract_svg(text: &str) -> Option<String> {
    find_block(text, "<svg", "</svg>").map(str::to_string)
}

pub fn extract_html(text: &str) -> Option<String> {
    find_block(text, "<!doctype html", "</html>")
        .or_else(|| find_block(text, "<html", "</html>"))
        .map(str::to_string)
}

/// First `data:image/...` URI in the text
pub fn extract_data_uri(text: &str) -> Option<String> {
    let start = text.find("data:image/")?;
    let uri: String = text[start..]
        .chars()
        .take_while(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | ')' | '<'))
        .collect();
    uri.contains(";base64,").then_some(uri)
}

/// Classify a text reply
pub fn extract_output(text: &str) -> GeneratedOutput {
    if let Some(svg) = extract_svg(text) {
        return GeneratedOutput::Svg(svg);
    }
    if let Some(html) = extract_html(text) {
        return GeneratedOutput::Html(html);
    }
    if let Some(uri) = extract_data_uri(text) {
        return GeneratedOutput::Image(uri);
    }
    GeneratedOutput::Text(strip_code_fence(text).to_string())
}

/// Classify reply content, preferring image parts over text parts
pub fn extract_reply(content: ReplyContent) -> GeneratedOutput {
    match content {
        ReplyContent::Text(text) => extract_output(&text),
        ReplyContent::Parts(parts) => {
            let mut text = String::new();
            for part in parts {
                match part {
                    ContentPart::ImageUrl { image_url } => {
                        return GeneratedOutput::Image(image_url.url)
                    }
                    ContentPart::Text { text: chunk } => text.push_str(&chunk),
                }
            }
            extract_output(&text)
        }
    }
}

/// First JSON object in the text, if it parses
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let body = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str(body) {
        return Some(value);
    }
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_svg_in_prose_and_fence() {
        let reply = "Here you go:\n```svg\n<SVG width=\"10\"><rect/></svg>\n```\nEnjoy!";
        assert_eq!(
            extract_output(reply),
            GeneratedOutput::Svg("<SVG width=\"10\"><rect/></svg>".to_string())
        );
    }

    #[test]
    fn test_html_document() {
        let reply = "<!DOCTYPE html><html><body>Hi</body></html> trailing";
        assert_eq!(
            extract_output(reply),
            GeneratedOutput::Html("<!DOCTYPE html><html><body>Hi</body></html>".to_string())
        );
    }

    #[test]
    fn test_data_uri_reply() {
        let reply = "![img](data:image/png;base64,iVBORw0KGgo=)";
        assert_eq!(
            extract_output(reply),
            GeneratedOutput::Image("data:image/png;base64,iVBORw0KGgo=".to_string())
        );
    }

    #[test]
    fn test_plain_text_fence_stripped() {
        assert_eq!(
            extract_output("```\nsome notes\n```"),
            GeneratedOutput::Text("some notes".to_string())
        );
        assert_eq!(strip_code_fence("  plain  "), "plain");
    }

    #[test]
    fn test_image_part_wins() {
        let content = ReplyContent::Parts(vec![
            ContentPart::text("<svg></svg>"),
            ContentPart::image("data:image/png;base64,AA"),
        ]);
        assert_eq!(
            extract_reply(content),
            GeneratedOutput::Image("data:image/png;base64,AA".to_string())
        );
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(
            extract_json("```json\n{\"summary\": \"ok\"}\n```"),
            Some(json!({ "summary": "ok" }))
        );
        assert_eq!(
            extract_json("Report: {\"a\": [1, 2]} done"),
            Some(json!({ "a": [1, 2] }))
        );
        assert_eq!(extract_json("no json here"), None);
    }
}
