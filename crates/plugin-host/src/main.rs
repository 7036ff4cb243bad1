//! `atelier <document.json> <request.json> [config.json]`
//!
//! Answers one plugin request against a document snapshot and prints the
//! JSON response.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use generation::GenerationClient;
use plugin_host::{
    MessageHandler, PluginChannel, PluginConfig, PluginError, RequestBridge, RequestEnvelope,
    Result,
};
use scene_graph::MemoryHost;
use selection_engine::SelectionEngine;

const USAGE: &str = "usage: atelier <document.json> <request.json> [config.json]";

async fn read_json(path: &Path, what: &'static str) -> Result<serde_json::Value> {
    let contents = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&contents).map_err(|err| PluginError::parse(what, err))
}

async fn run(document: PathBuf, request: PathBuf, config: Option<PathBuf>) -> Result<String> {
    let config = match config {
        Some(path) => PluginConfig::load(&path).await?,
        None => PluginConfig::default(),
    };

    let host = MemoryHost::from_json(read_json(&document, "document").await?)?;
    let envelope: RequestEnvelope = serde_json::from_value(read_json(&request, "request").await?)
        .map_err(|err| PluginError::parse("request", err))?;

    let engine = SelectionEngine::new(Arc::new(host), config.selection.clone());
    let generator = match GenerationClient::new(config.generation.clone()) {
        Ok(client) => Some(client),
        Err(err) => {
            log::warn!("Generation disabled: {}", err);
            None
        }
    };

    let channel = PluginChannel::new(
        MessageHandler::new(engine, generator),
        RequestBridge::new(Duration::from_millis(config.request_timeout_ms)),
    );

    let mut response = channel.call(envelope.request).await;
    response.request_id = envelope.request_id;
    serde_json::to_string_pretty(&response).map_err(|err| PluginError::parse("response", err))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let (Some(document), Some(request)) = (args.next(), args.next()) else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };
    let config = args.next();

    match run(document, request, config).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
