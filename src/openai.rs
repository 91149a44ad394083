//! OpenAI-compatible client configuration.
//!
//! Story text comes from any server speaking the chat completions API. Ollama
//! serves one at `http://localhost:11434/v1`.

use crate::config::LlmSettings;
use crate::error::{Result, StoryError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the configured endpoint with a request timeout.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.trim_end_matches('/'))
        .with_api_key(settings.api_key());

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Build a plain HTTP client for the audio services.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| StoryError::Config(format!("Failed to create HTTP client: {}", e)))
}
