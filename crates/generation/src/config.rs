//! Generation service configuration

use serde::{Deserialize, Serialize};

/// Connection and sampling settings for the chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the OpenAI-compatible server
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Whole-request timeout
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: Some(4096),
            temperature: Some(0.7),
            timeout_secs: 120,
        }
    }
}

impl GenerationConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenerationConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_tokens, Some(4096));
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let config = GenerationConfig {
            base_url: "https://api.example.com/".to_string(),
            ..GenerationConfig::default()
        };
        assert_eq!(
            config.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }
}
