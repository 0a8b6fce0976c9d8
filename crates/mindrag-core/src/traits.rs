use crate::types::RetrievedContext;

/// Text-to-vector capability injected into the retrieval engine.
///
/// `embed_batch` returns one vector per input, in input order, each of length `dim()`.
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Turns retrieved context into the final answer text.
pub trait AnswerComposer: Send + Sync {
    fn compose(&self, context: &RetrievedContext) -> anyhow::Result<String>;
}
