//! Domain types shared by the extractor, the vector index and the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ChunkId = String;

/// Which structural element of the mindmap a chunk was rendered from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Topic,
    Subtopic,
    Relationship,
}

impl ChunkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
            Self::Relationship => "relationship",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retrievable text fragment derived from one element of the mindmap.
///
/// - `id`: unique within one extraction pass (`topic:0`, `subtopic:0.1`, `relationship:3`)
/// - `text`: natural-language rendering of the element's fields
/// - `kind`: diagnostic tag, never used for ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub kind: ChunkKind,
}

/// One prior turn of the chat the question belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub speaker: String,
    pub text: String,
}

impl ChatTurn {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self { speaker: speaker.into(), text: text.into() }
    }
}

/// A follow-up question from the chat handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// A chunk as returned to the answer composer. Smaller `distance` is more similar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedChunk {
    pub id: ChunkId,
    pub text: String,
    pub kind: ChunkKind,
    pub distance: f32,
}

/// Everything the answer composer needs: ranked context plus the untouched question and history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedContext {
    pub question: String,
    pub history: Vec<ChatTurn>,
    pub chunks: Vec<RankedChunk>,
    /// Build generation of the index that served the query.
    pub generation: u64,
}
