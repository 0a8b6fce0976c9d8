//! Helpers behind the `mindrag` binary.

pub mod composer;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use mindrag_core::mindmap::{MindmapDocument, MindmapPayload};
use mindrag_core::traits::{AnswerComposer, Embedder};
use mindrag_core::types::{ChatTurn, RetrievedContext};
use mindrag_engine::RetrievalEngine;

pub use composer::OllamaComposer;

/// Read a mindmap file in any accepted payload shape.
pub fn read_mindmap(path: &Path) -> Result<MindmapDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = MindmapPayload::from_json_str(&raw)
        .and_then(MindmapPayload::normalize)
        .with_context(|| format!("parsing mindmap {}", path.display()))?;
    Ok(doc)
}

/// Read a JSON array of `{speaker, text}` turns; no file means no history.
pub fn read_history(path: Option<&Path>) -> Result<Vec<ChatTurn>> {
    let Some(path) = path else { return Ok(Vec::new()) };
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing chat history {}", path.display()))
}

/// Context for answering without retrieval, used when the engine cannot serve the question.
pub fn context_without_retrieval(question: &str, history: Vec<ChatTurn>) -> RetrievedContext {
    RetrievedContext { question: question.to_string(), history, chunks: Vec::new(), generation: 0 }
}

/// Build an index over `doc` and retrieve context for `question`.
///
/// A failed build or a degradable query error yields an empty context; other
/// query errors are returned.
pub fn retrieve_or_degrade(
    doc: &MindmapDocument,
    question: &str,
    top_k: usize,
    history: Vec<ChatTurn>,
    embedder: mindrag_core::Result<Arc<dyn Embedder>>,
) -> mindrag_core::Result<RetrievedContext> {
    let embedder = match embedder {
        Ok(embedder) => embedder,
        Err(e) => {
            warn!(error = %e, "embeddings unavailable, answering without retrieved context");
            return Ok(context_without_retrieval(question, history));
        }
    };
    let engine = RetrievalEngine::new(embedder);
    if let Err(e) = engine.rebuild(doc) {
        warn!(error = %e, "index build failed");
    }
    match engine.query(question, top_k, &history) {
        Ok(context) => Ok(context),
        Err(e) if e.is_degradable() => {
            warn!(error = %e, "answering without retrieved context");
            Ok(context_without_retrieval(question, history))
        }
        Err(e) => Err(e),
    }
}

/// Retrieval problems degrade to answering without context; composer failures do not.
pub fn ask(
    doc: &MindmapDocument,
    question: &str,
    top_k: usize,
    history: Vec<ChatTurn>,
    embedder: mindrag_core::Result<Arc<dyn Embedder>>,
    composer: &dyn AnswerComposer,
) -> Result<String> {
    let context = retrieve_or_degrade(doc, question, top_k, history, embedder)?;
    info!(chunks = context.chunks.len(), "composing answer");
    composer.compose(&context).context("composing answer")
}
