//! Answer composer backed by an Ollama chat model.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use mindrag_core::config::ComposerSettings;
use mindrag_core::traits::AnswerComposer;
use mindrag_core::types::RetrievedContext;
use mindrag_engine::render_prompt;

pub struct OllamaComposer {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaComposer {
    pub fn from_settings(settings: &ComposerSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: settings.url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// The chat sent to the model: one user turn holding the rendered prompt.
pub fn chat_messages(context: &RetrievedContext) -> Vec<ChatMessage> {
    vec![ChatMessage { role: "user".to_string(), content: render_prompt(context) }]
}

impl AnswerComposer for OllamaComposer {
    fn compose(&self, context: &RetrievedContext) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: chat_messages(context),
            stream: false,
            options: ChatOptions { temperature: self.temperature },
        };
        debug!(model = %self.model, chunks = context.chunks.len(), "requesting answer");

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .with_context(|| format!("Ollama request to {} failed", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            bail!("Ollama error {}: {}", status, text);
        }
        let result: ChatResponse = response.json().context("Invalid Ollama chat response")?;
        Ok(result.message.content)
    }
}
