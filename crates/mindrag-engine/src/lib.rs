//! Retrieval engine: mindmap → chunks → embeddings → flat index, then
//! question → ranked chunks.
//!
//! The active index lives behind an [`ArcSwapOption`]. A rebuild constructs a
//! complete new index off to the side and swaps it in; readers that loaded the
//! previous one keep it alive until they finish. Every rebuild draws a
//! generation number when it starts and only publishes if no newer generation
//! is already active, so a slow build can never overwrite a fresher one.

pub mod compose;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tracing::{debug, info, warn};

use mindrag_core::extract::extract_chunks;
use mindrag_core::mindmap::MindmapDocument;
use mindrag_core::traits::{AnswerComposer, Embedder};
use mindrag_core::types::{ChatTurn, QueryRequest, RankedChunk, RetrievedContext};
use mindrag_core::{EmbedStage, Error, Result};
use mindrag_vector::FlatIndex;

pub use compose::{render_context, render_prompt};

/// One published index together with the build that produced it.
#[derive(Debug)]
pub struct ActiveIndex {
    pub generation: u64,
    pub model_id: String,
    pub index: FlatIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No build has succeeded yet.
    Uninitialized,
    /// At least one build is in flight. Queries keep using the previous index, if any.
    Building,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub generation: u64,
    pub chunks: usize,
    pub dim: Option<usize>,
    pub elapsed: Duration,
    /// False when a newer build was already active and this result was discarded.
    pub published: bool,
}

pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    active: ArcSwapOption<ActiveIndex>,
    generations: AtomicU64,
    in_flight: AtomicUsize,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            active: ArcSwapOption::empty(),
            generations: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Extract, embed and index `doc`, then make it the active index.
    ///
    /// On failure the previously active index stays in place.
    pub fn rebuild(&self, doc: &MindmapDocument) -> Result<BuildReport> {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let _building = InFlight::enter(&self.in_flight);
        let start = Instant::now();

        let index = match self.build_index(doc) {
            Ok(index) => index,
            Err(e) => {
                warn!(generation, error = %e, "rebuild failed, keeping the previous index");
                return Err(e);
            }
        };
        let (chunks, dim) = (index.len(), index.dim());
        let fresh = Arc::new(ActiveIndex { generation, model_id: self.embedder.model_id().to_string(), index });

        let previous = self.active.rcu(|current| match current {
            Some(cur) if cur.generation > generation => Some(Arc::clone(cur)),
            _ => Some(Arc::clone(&fresh)),
        });
        let published = previous.as_ref().map_or(true, |p| p.generation < generation);
        let elapsed = start.elapsed();
        if published {
            info!(generation, chunks, elapsed_ms = elapsed.as_millis() as u64, "published new index");
        } else {
            warn!(generation, "rebuild finished after a newer one, discarding its index");
        }
        Ok(BuildReport { generation, chunks, dim, elapsed, published })
    }

    fn build_index(&self, doc: &MindmapDocument) -> Result<FlatIndex> {
        if doc.is_empty() {
            debug!("empty mindmap, publishing an empty index");
            return Ok(FlatIndex::default());
        }
        let chunks = extract_chunks(doc);

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .map_err(|e| Error::embedding(EmbedStage::Build, format!("{e:#}")))?;
        if vectors.len() != texts.len() {
            return Err(Error::embedding(
                EmbedStage::Build,
                format!("provider returned {} vectors for {} chunks", vectors.len(), texts.len()),
            ));
        }
        let declared = self.embedder.dim();
        if let Some(first) = vectors.first().filter(|v| v.len() != declared) {
            return Err(Error::DimensionMismatch {
                expected: declared,
                actual: first.len(),
                context: format!("vector for chunk '{}' from provider {}", chunks[0].id, self.embedder.model_id()),
            });
        }
        FlatIndex::build(chunks, vectors)
    }

    /// Rank the active index's chunks against `question`.
    ///
    /// Only the question is embedded; `history` is carried through untouched for the composer.
    pub fn query(&self, question: &str, top_k: usize, history: &[ChatTurn]) -> Result<RetrievedContext> {
        let active = self.active.load_full().ok_or(Error::EngineNotReady)?;
        let start = Instant::now();

        let query_vec = self.embed_question(question)?;
        let hits = active.index.search(&query_vec, top_k)?;
        debug!(
            generation = active.generation,
            top_k,
            hits = hits.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "query served"
        );

        Ok(RetrievedContext {
            question: question.to_string(),
            history: history.to_vec(),
            chunks: hits.into_iter().map(RankedChunk::from).collect(),
            generation: active.generation,
        })
    }

    /// Retrieve context for `request` and let `composer` write the answer, returned unchanged.
    pub fn answer(&self, request: &QueryRequest, top_k: usize, composer: &dyn AnswerComposer) -> Result<String> {
        let context = self.query(&request.question, top_k, &request.history)?;
        composer.compose(&context).map_err(|e| Error::AnswerComposition(format!("{e:#}")))
    }

    fn embed_question(&self, question: &str) -> Result<Vec<f32>> {
        self.embedder
            .embed_batch(&[question.to_string()])
            .map_err(|e| Error::embedding(EmbedStage::Query, format!("{e:#}")))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding(EmbedStage::Query, "provider returned no vector for the question"))
    }

    /// The currently active index. Holding the `Arc` keeps it usable across later swaps.
    pub fn snapshot(&self) -> Option<Arc<ActiveIndex>> {
        self.active.load_full()
    }

    /// Generation of the active index, if any.
    pub fn generation(&self) -> Option<u64> {
        self.active.load_full().map(|a| a.generation)
    }

    pub fn state(&self) -> EngineState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            EngineState::Building
        } else if self.active.load().is_some() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }
}

/// Counts a build as in flight until dropped, on every exit path.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
