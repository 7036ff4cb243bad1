//! Request dispatch
//!
//! `MessageHandler` answers one `PluginRequest` at a time against the
//! selection engine and, for generation requests, the generation client.
//! Every payload passes the serialization guard before it is returned;
//! failures become an `error` field on the response.

use std::sync::Arc;

use generation::{ChatTransport, GenerationClient, GenerationInput, HttpTransport};
use selection_engine::{sanitize, SelectionEngine, SelectionRequest, TemplateType};
use serde::Serialize;
use serde_json::Value;

use crate::bridge::RequestBridge;
use crate::error::{PluginError, Result};
use crate::protocol::{PluginRequest, PluginResponse, RequestEnvelope};

/// Dispatches plugin requests
pub struct MessageHandler<T: ChatTransport = HttpTransport> {
    engine: SelectionEngine,
    generator: Option<GenerationClient<T>>,
}

impl<T: ChatTransport> MessageHandler<T> {
    pub fn new(engine: SelectionEngine, generator: Option<GenerationClient<T>>) -> Self {
        Self { engine, generator }
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    /// Answer one request
    pub async fn handle(&self, envelope: RequestEnvelope) -> PluginResponse {
        let RequestEnvelope {
            request_id,
            request,
        } = envelope;
        let kind = request.kind();
        log::debug!("Handling {} ({:?})", kind, request_id);

        match self.dispatch(kind, request_id.clone(), request).await {
            Ok(response) => response,
            Err(err) => {
                log::error!("{} failed: {}", kind, err);
                PluginResponse::failed(kind, request_id, err)
            }
        }
    }

    async fn dispatch(
        &self,
        kind: &str,
        request_id: Option<String>,
        request: PluginRequest,
    ) -> Result<PluginResponse> {
        let respond = |data: Value| PluginResponse::new(kind, request_id.clone(), data);

        match request {
            PluginRequest::GetSelectionInfo(selection) => {
                let outcome = self.engine.get_selection_info(&selection).await;
                let error = outcome.error();
                Ok(respond(outcome.selection)
                    .with_skipped(outcome.skipped)
                    .with_error(error))
            }
            PluginRequest::ExportElementsAsImages { node_ids } => {
                let elements = self.engine.export_elements_as_images(&node_ids).await;
                Ok(respond(guarded(&elements)?))
            }
            PluginRequest::GetLayersList => Ok(respond(guarded(&self.engine.get_layers_list())?)),
            PluginRequest::GetLayerSelectionInfo {
                layer_id,
                include_children,
                include_images,
            } => {
                let outcome = self
                    .engine
                    .get_layer_selection_info(&layer_id, include_children, include_images)
                    .await?;
                let error = outcome.error();
                let info = outcome.entries().first().cloned().unwrap_or(Value::Null);
                Ok(respond(info).with_error(error))
            }
            PluginRequest::CollectPageData => {
                Ok(respond(guarded(&self.engine.collect_page_data())?))
            }
            PluginRequest::CollectDesignTokens => {
                Ok(respond(guarded(&self.engine.collect_design_tokens())?))
            }
            PluginRequest::Generate { prompt, selection } => {
                let generator = self.generator()?;
                let input = self.generation_input(prompt, &selection).await;
                let output = generator.generate(&input).await?;
                Ok(respond(guarded(&output)?))
            }
            PluginRequest::GenerateBatch { prompts, selection } => {
                let generator = self.generator()?;
                let input = self.generation_input(String::new(), &selection).await;
                let outcome = generator.generate_batch(&prompts, &input).await;
                let error = outcome.error.clone();
                Ok(respond(guarded(&outcome.completed)?).with_error(error))
            }
            PluginRequest::Research { prompt, selection } => {
                let generator = self.generator()?;
                let selection = SelectionRequest {
                    template_type: TemplateType::Research,
                    ..selection
                };
                let input = self.generation_input(prompt, &selection).await;
                let report = generator.research(&input).await?;
                Ok(respond(guarded(&report)?))
            }
        }
    }

    fn generator(&self) -> Result<&GenerationClient<T>> {
        self.generator
            .as_ref()
            .ok_or(PluginError::GenerationUnavailable)
    }

    /// Serialize the selection and pull its screenshots out as attachments
    async fn generation_input(&self, prompt: String, request: &SelectionRequest) -> GenerationInput {
        let outcome = self.engine.get_selection_info(request).await;
        let images = outcome
            .entries()
            .iter()
            .filter_map(|entry| entry.get("imageData").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        GenerationInput {
            prompt,
            selection: strip_images(outcome.selection),
            images,
            system: None,
        }
    }
}

fn guarded<S: Serialize + ?Sized>(value: &S) -> Result<Value> {
    Ok(sanitize(value)?)
}

/// Drop `imageData` from a selection batch; images travel as attachments
fn strip_images(mut selection: Value) -> Value {
    if let Some(entries) = selection.as_array_mut() {
        for entry in entries {
            if let Some(map) = entry.as_object_mut() {
                map.remove("imageData");
            }
        }
    }
    selection
}

/// A handler reached through a request bridge, the way the UI reaches
/// the plugin: every call is correlated by id and falls back to a
/// timeout response when no answer arrives in time.
pub struct PluginChannel<T: ChatTransport = HttpTransport> {
    handler: Arc<MessageHandler<T>>,
    bridge: Arc<RequestBridge<PluginResponse>>,
}

impl<T: ChatTransport + 'static> PluginChannel<T> {
    pub fn new(handler: MessageHandler<T>, bridge: RequestBridge<PluginResponse>) -> Self {
        Self {
            handler: Arc::new(handler),
            bridge: Arc::new(bridge),
        }
    }

    pub async fn call(&self, request: PluginRequest) -> PluginResponse {
        let kind = request.kind();
        let fallback = PluginResponse::failed(
            kind,
            None,
            format!("No response within {:?}", self.bridge.timeout()),
        );

        let handler = Arc::clone(&self.handler);
        let bridge = Arc::clone(&self.bridge);
        self.bridge
            .request(
                move |id| {
                    tokio::spawn(async move {
                        let envelope = RequestEnvelope {
                            request_id: Some(id.to_string()),
                            request,
                        };
                        let response = handler.handle(envelope).await;
                        bridge.resolve(id, response);
                    });
                },
                fallback,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use generation::{GenerationConfig, GenerationError, ReplyContent};
    use scene_graph::MemoryHost;
    use selection_engine::SelectionConfig;
    use serde_json::json;
    use std::time::Duration;

    struct EchoTransport;

    #[async_trait]
    impl ChatTransport for EchoTransport {
        async fn complete(
            &self,
            request: &generation::ChatRequest,
        ) -> generation::Result<ReplyContent> {
            let parts = request.messages.last().map(|m| m.content.len()).unwrap_or(0);
            if parts == 0 {
                return Err(GenerationError::EmptyReply);
            }
            Ok(ReplyContent::Text(format!(
                "<svg data-parts=\"{}\"></svg>",
                parts
            )))
        }
    }

    fn engine() -> SelectionEngine {
        let host = MemoryHost::with_selection(json!([
            { "id": "1:1", "name": "Card", "type": "FRAME", "width": 200, "height": 100,
              "fills": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 1 } }],
              "children": [
                  { "id": "1:2", "name": "Title", "type": "TEXT", "text": { "characters": "Plans" } }
              ] },
            { "id": "2:1", "name": "Wall", "type": "FRAME", "width": 50000, "height": 10 }
        ]))
        .unwrap();
        SelectionEngine::new(Arc::new(host), SelectionConfig::default())
    }

    fn handler() -> MessageHandler<EchoTransport> {
        let generator =
            GenerationClient::with_transport(GenerationConfig::default(), EchoTransport);
        MessageHandler::new(engine(), Some(generator))
    }

    fn envelope(value: Value) -> RequestEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_selection_info_response() {
        let response = handler()
            .handle(envelope(json!({
                "type": "get-selection-info",
                "requestId": "r1",
                "includeChildren": true
            })))
            .await;

        assert_eq!(response.kind, "get-selection-info-result");
        assert_eq!(response.request_id.as_deref(), Some("r1"));
        assert_eq!(response.data.as_array().unwrap().len(), 1);
        assert_eq!(response.skipped[0].id, "2:1");
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_unknown_layer_is_error_field() {
        let response = handler()
            .handle(envelope(json!({ "type": "get-layer-selection-info", "layerId": "nope" })))
            .await;
        assert_eq!(response.data, Value::Null);
        assert!(response.error.unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_document_reads() {
        let handler = handler();
        let layers = handler
            .handle(envelope(json!({ "type": "get-layers-list" })))
            .await;
        assert_eq!(layers.data.as_array().unwrap().len(), 3);

        let page = handler
            .handle(envelope(json!({ "type": "collect-page-data" })))
            .await;
        assert_eq!(page.data["analysis"]["frameCount"], 2);

        let tokens = handler
            .handle(envelope(json!({ "type": "collect-design-tokens" })))
            .await;
        assert_eq!(tokens.data, json!({ "colors": [], "texts": [], "effects": [] }));
    }

    #[tokio::test]
    async fn test_generate_attaches_images() {
        let response = handler()
            .handle(envelope(json!({
                "type": "generate",
                "prompt": "Make it pop",
                "selection": { "includeImages": true }
            })))
            .await;

        assert_eq!(response.data["kind"], "svg");
        assert_eq!(response.data["content"], "<svg data-parts=\"3\"></svg>");
    }

    #[tokio::test]
    async fn test_generation_unavailable() {
        let handler: MessageHandler<EchoTransport> = MessageHandler::new(engine(), None);
        let response = handler
            .handle(envelope(json!({ "type": "research", "prompt": "Summarize" })))
            .await;
        assert_eq!(response.error.as_deref(), Some("Generation is not configured"));
    }

    #[tokio::test]
    async fn test_channel_round_trip() {
        let channel = PluginChannel::new(handler(), RequestBridge::new(Duration::from_secs(5)));
        let response = channel.call(PluginRequest::GetLayersList).await;

        assert!(response.error.is_none());
        assert!(response.request_id.is_some());
        assert_eq!(response.data[0]["id"], "1:1");
    }
}
