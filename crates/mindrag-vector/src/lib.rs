//! Exact nearest-neighbor index over chunk embeddings.
//!
//! Brute-force squared-L2 scan. Corpora are one conversation's mindmap (tens to
//! a few hundred chunks), so the scan is cheap and the ranking is exact. Ties
//! on distance resolve by insertion order, which keeps repeated queries
//! reproducible.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use mindrag_core::types::{Chunk, ChunkId};
use mindrag_core::{Error, Result};

/// Immutable (chunk, vector) store for one mindmap version.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    chunks: Vec<Chunk>,
    /// Row-major, `chunks.len() * dim` components.
    vectors: Vec<f32>,
    dim: usize,
    positions: HashMap<ChunkId, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// Squared Euclidean distance; smaller is more similar.
    pub distance: f32,
    /// Insertion position of the chunk.
    pub position: usize,
}

impl FlatIndex {
    /// Build over parallel `chunks`/`vectors`. Zero chunks yields a valid empty index.
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(Error::CountMismatch { chunks: chunks.len(), vectors: vectors.len() });
        }
        let Some(dim) = vectors.first().map(Vec::len) else {
            return Ok(Self::default());
        };

        let mut flat = Vec::with_capacity(dim * vectors.len());
        for (position, (chunk, vector)) in chunks.iter().zip(&vectors).enumerate() {
            if vector.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                    context: format!("vector for chunk '{}' at position {position}", chunk.id),
                });
            }
            check_finite(vector, || format!("vector for chunk '{}' at position {position}", chunk.id))?;
            flat.extend_from_slice(vector);
        }

        let mut positions = HashMap::with_capacity(chunks.len());
        for (position, chunk) in chunks.iter().enumerate() {
            positions.entry(chunk.id.clone()).or_insert(position);
        }
        debug!(chunks = chunks.len(), dim, "built flat index");
        Ok(Self { chunks, vectors: flat, dim, positions })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Vector length, or `None` for an empty index.
    pub fn dim(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.dim)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn get(&self, id: &str) -> Option<&Chunk> {
        self.positions.get(id).map(|&p| &self.chunks[p])
    }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        (position < self.len()).then(|| &self.vectors[position * self.dim..(position + 1) * self.dim])
    }

    /// The `top_k` nearest chunks, ascending by distance.
    ///
    /// An empty index returns nothing whatever the query; otherwise the query
    /// must match the index dimension and be finite.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
                context: "query vector".to_string(),
            });
        }
        check_finite(query, || "query vector".to_string())?;

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(top_k.min(self.len()) + 1);
        for (position, row) in self.vectors.chunks_exact(self.dim).enumerate() {
            let candidate = Candidate { distance: squared_l2(query, row), position };
            if heap.len() < top_k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| SearchHit { chunk: self.chunks[c.position].clone(), distance: c.distance, position: c.position })
            .collect())
    }
}

/// NaN or infinite components would poison distances and their ordering.
fn check_finite(vector: &[f32], context: impl FnOnce() -> String) -> Result<()> {
    match vector.iter().position(|x| !x.is_finite()) {
        Some(component) => Err(Error::InvalidVector { context: context(), component, value: vector[component] }),
        None => Ok(()),
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Heap entry ordered by (distance, insertion position).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    position: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance).then(self.position.cmp(&other.position))
    }
}

impl From<SearchHit> for mindrag_core::types::RankedChunk {
    fn from(hit: SearchHit) -> Self {
        Self { id: hit.chunk.id, text: hit.chunk.text, kind: hit.chunk.kind, distance: hit.distance }
    }
}
