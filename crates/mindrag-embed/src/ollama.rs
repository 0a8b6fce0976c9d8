//! Embeddings served by an Ollama instance over HTTP.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use mindrag_core::traits::Embedder;

pub struct OllamaEmbedder {
    http: Client,
    base_url: String,
    model: String,
    id: String,
    dim: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Build the client and probe the model once to learn its dimensionality.
    pub fn connect(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().context("Failed to create HTTP client")?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let probe = request_embeddings(&http, &base_url, model, &["dimension probe".to_string()])?;
        let dim = probe.first().map(Vec::len).filter(|d| *d > 0).ok_or_else(|| anyhow!("Ollama returned an empty probe embedding"))?;
        let id = format!("ollama:{model}:d{dim}");
        info!(url = %base_url, model = %id, "connected to Ollama embeddings");
        Ok(Self { http, base_url, model: model.to_string(), id, dim })
    }
}

impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(texts = texts.len(), model = %self.model, "requesting embeddings");
        let embeddings = request_embeddings(&self.http, &self.base_url, &self.model, texts)?;
        if embeddings.len() != texts.len() {
            bail!("Ollama returned {} embeddings for {} texts", embeddings.len(), texts.len());
        }
        Ok(embeddings)
    }
}

fn request_embeddings(http: &Client, base_url: &str, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let response = http
        .post(format!("{base_url}/api/embed"))
        .json(&EmbedRequest { model, input: texts })
        .send()
        .with_context(|| format!("Ollama request to {base_url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().unwrap_or_default();
        bail!("Ollama error {}: {}", status, text);
    }
    let body: EmbedResponse = response.json().context("Invalid Ollama embed response")?;
    Ok(body.embeddings)
}
