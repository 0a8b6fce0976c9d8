//! mindrag-embed
//!
//! Embedding providers behind `mindrag_core::traits::Embedder`: a local candle
//! BERT encoder, an Ollama HTTP client, and a deterministic hashing fake for
//! tests. [`load_embedder`] picks one from configuration.

pub mod device;
pub mod model;
pub mod ollama;
pub mod pool;
pub mod tokenize;

use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use twox_hash::XxHash64;

use mindrag_core::config::{expand_path, EmbeddingBackend, EmbeddingSettings};
use mindrag_core::traits::Embedder;
use mindrag_core::{EmbedStage, Error, Result};

pub use model::MiniLmEmbedder;
pub use ollama::OllamaEmbedder;
pub use pool::masked_mean_l2;

/// Bag-of-words hashing embedder: lowercased alphanumeric tokens land in signed
/// buckets, then the vector is L2-normalized. Texts sharing words end up close.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("fake:xxh64:d{dim}") }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.to_lowercase().as_bytes());
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn fake_forced() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Build the configured provider. `APP_USE_FAKE_EMBEDDINGS=1` forces the fake one.
pub fn load_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let backend = if fake_forced() { EmbeddingBackend::Fake } else { settings.backend };
    match backend {
        EmbeddingBackend::Fake => {
            info!(dim = settings.dim, "using FakeEmbedder");
            Ok(Arc::new(FakeEmbedder::new(settings.dim)))
        }
        EmbeddingBackend::Local => {
            let dir = model::resolve_model_dir(&expand_path(&settings.model_dir))
                .map_err(|e| Error::embedding(EmbedStage::ModelLoad, format!("{e:#}")))?;
            let model = MiniLmEmbedder::load(&dir, settings.max_len, settings.batch_size)
                .map_err(|e| Error::embedding(EmbedStage::ModelLoad, format!("{e:#}")))?;
            Ok(Arc::new(model))
        }
        EmbeddingBackend::Ollama => {
            let timeout = Duration::from_secs(settings.timeout_secs);
            let client = OllamaEmbedder::connect(&settings.ollama_url, &settings.ollama_model, timeout)
                .map_err(|e| Error::embedding(EmbedStage::ModelLoad, format!("{e:#}")))?;
            Ok(Arc::new(client))
        }
    }
}
