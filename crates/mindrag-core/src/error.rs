use std::fmt;

use thiserror::Error;

/// Where an embedding call was made when the provider failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedStage {
    ModelLoad,
    Build,
    Query,
}

impl fmt::Display for EmbedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ModelLoad => "model load",
            Self::Build => "index build",
            Self::Query => "query",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed mindmap: {0}")]
    MalformedInput(String),

    #[error("Embedding backend unavailable during {stage}: {reason}")]
    EmbeddingUnavailable { stage: EmbedStage, reason: String },

    #[error("Dimension mismatch at {context}: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize, context: String },

    #[error("Invalid vector at {context}: component {component} is {value}")]
    InvalidVector { context: String, component: usize, value: f32 },

    #[error("Vector count mismatch: {chunks} chunks but {vectors} vectors")]
    CountMismatch { chunks: usize, vectors: usize },

    #[error("Retrieval engine not ready: no index has been built yet")]
    EngineNotReady,

    #[error("Answer composition failed: {0}")]
    AnswerComposition(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn embedding(stage: EmbedStage, err: impl fmt::Display) -> Self {
        Self::EmbeddingUnavailable { stage, reason: err.to_string() }
    }

    /// Errors a chat handler can recover from by answering without retrieved context.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::EngineNotReady | Self::DimensionMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
