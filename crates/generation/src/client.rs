//! Generation client
//!
//! Sends a prompt plus the serialized selection (and optional screenshots)
//! to a chat-completions endpoint and post-processes the reply. The HTTP
//! call sits behind `ChatTransport` so batch and research flows can be
//! exercised without a server.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use crate::markup::{extract_json, extract_reply, GeneratedOutput};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ContentPart, ReplyContent};

/// Something that can answer a chat request
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ReplyContent>;
}

/// `ChatTransport` over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.completions_url(),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ReplyContent> {
        let response = self.client.post(&self.url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let reply: ChatResponse = response.json().await?;
        reply.into_content().ok_or(GenerationError::EmptyReply)
    }
}

/// One generation call
#[derive(Debug, Clone, Default)]
pub struct GenerationInput {
    pub prompt: String,
    /// Sanitized selection, sent as JSON text
    pub selection: Value,
    /// Data URIs attached as image parts
    pub images: Vec<String>,
    pub system: Option<String>,
}

/// One completed batch entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub prompt: String,
    pub output: GeneratedOutput,
}

/// Results of a batch, up to the first transport failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub completed: Vec<BatchItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Research answer: a JSON report, or the raw reply when it is not JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "report", rename_all = "snake_case")]
pub enum ResearchReport {
    Structured(Value),
    Raw(String),
}

const RESEARCH_INSTRUCTION: &str =
    "Answer with a single JSON object summarizing the selected elements.";

/// Chat-completions client
pub struct GenerationClient<T: ChatTransport = HttpTransport> {
    config: GenerationConfig,
    transport: T,
}

impl GenerationClient<HttpTransport> {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: ChatTransport> GenerationClient<T> {
    pub fn with_transport(config: GenerationConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Build the request for one input
    pub fn build_request(&self, input: &GenerationInput) -> ChatRequest {
        let mut content = vec![ContentPart::text(&input.prompt)];
        if !input.selection.is_null() {
            content.push(ContentPart::text(format!(
                "Selected elements:\n{}",
                input.selection
            )));
        }
        content.extend(input.images.iter().map(ContentPart::image));

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &input.system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(content));

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            stream: false,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Run one generation and classify the reply
    pub async fn generate(&self, input: &GenerationInput) -> Result<GeneratedOutput> {
        log::debug!(
            "Generating for prompt '{}' with {} image(s)",
            input.prompt.chars().take(50).collect::<String>(),
            input.images.len()
        );
        let reply = self.transport.complete(&self.build_request(input)).await?;
        Ok(extract_reply(reply))
    }

    /// Run one generation per prompt, in order. The first failure stops
    /// the batch; results already produced are kept.
    pub async fn generate_batch(&self, prompts: &[String], base: &GenerationInput) -> BatchOutcome {
        let mut completed = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            let input = GenerationInput {
                prompt: prompt.clone(),
                ..base.clone()
            };
            match self.generate(&input).await {
                Ok(output) => completed.push(BatchItem {
                    prompt: prompt.clone(),
                    output,
                }),
                Err(err) => {
                    log::error!(
                        "Batch generation stopped after {} of {} prompt(s): {}",
                        completed.len(),
                        prompts.len(),
                        err
                    );
                    return BatchOutcome {
                        completed,
                        error: Some(err.to_string()),
                    };
                }
            }
        }
        BatchOutcome {
            completed,
            error: None,
        }
    }

    /// Ask for a structured report over the selection
    pub async fn research(&self, input: &GenerationInput) -> Result<ResearchReport> {
        let input = GenerationInput {
            system: Some(
                input
                    .system
                    .clone()
                    .unwrap_or_else(|| RESEARCH_INSTRUCTION.to_string()),
            ),
            ..input.clone()
        };
        let text = match self.transport.complete(&self.build_request(&input)).await? {
            ReplyContent::Text(text) => text,
            ReplyContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect(),
        };

        Ok(match extract_json(&text) {
            Some(report) => ResearchReport::Structured(report),
            None => {
                log::warn!("Research reply was not JSON, keeping raw text");
                ResearchReport::Raw(text)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Replays canned replies and records requests
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<ReplyContent>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<ReplyContent>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn complete(&self, request: &ChatRequest) -> Result<ReplyContent> {
            self.requests.lock().push(request.clone());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyReply))
        }
    }

    fn text(reply: &str) -> Result<ReplyContent> {
        Ok(ReplyContent::Text(reply.to_string()))
    }

    fn client(replies: Vec<Result<ReplyContent>>) -> GenerationClient<ScriptedTransport> {
        GenerationClient::with_transport(GenerationConfig::default(), ScriptedTransport::new(replies))
    }

    fn input() -> GenerationInput {
        GenerationInput {
            prompt: "Build a landing page".to_string(),
            selection: json!([{ "id": "1:1", "name": "Hero", "type": "FRAME" }]),
            images: vec!["data:image/png;base64,AAAA".to_string()],
            system: None,
        }
    }

    #[test]
    fn test_build_request() {
        let client = client(vec![]);
        let request = client.build_request(&input());

        assert_eq!(request.model, "gpt-4o");
        assert!(!request.stream);
        assert_eq!(request.messages.len(), 1);
        let content = &request.messages[0].content;
        assert_eq!(content.len(), 3);
        assert!(matches!(&content[1], ContentPart::Text { text } if text.contains("\"Hero\"")));
        assert_eq!(content[2], ContentPart::image("data:image/png;base64,AAAA"));
    }

    #[tokio::test]
    async fn test_generate_extracts_svg() {
        let client = client(vec![text("Sure!\n<svg viewBox=\"0 0 1 1\"></svg>")]);
        let output = client.generate(&input()).await.unwrap();
        assert_eq!(output, GeneratedOutput::Svg("<svg viewBox=\"0 0 1 1\"></svg>".to_string()));
    }

    #[tokio::test]
    async fn test_batch_stops_on_error_and_keeps_results() {
        let client = client(vec![
            text("<svg>a</svg>"),
            Err(GenerationError::Api {
                status: 500,
                body: "boom".to_string(),
            }),
            text("<svg>c</svg>"),
        ]);
        let prompts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let outcome = client.generate_batch(&prompts, &input()).await;

        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.completed[0].prompt, "a");
        assert!(outcome.error.unwrap().contains("500"));
        assert_eq!(client.transport.requests.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_research_report() {
        let client = client(vec![
            text("```json\n{\"summary\": \"two cards\"}\n```"),
            text("I could not produce JSON"),
        ]);

        let structured = client.research(&input()).await.unwrap();
        assert_eq!(structured, ResearchReport::Structured(json!({ "summary": "two cards" })));

        let raw = client.research(&input()).await.unwrap();
        assert_eq!(raw, ResearchReport::Raw("I could not produce JSON".to_string()));

        let requests = client.transport.requests.lock();
        assert_eq!(requests[0].messages[0].role, "system");
    }
}
