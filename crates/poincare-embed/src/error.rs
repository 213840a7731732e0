//! Error types for graph ingestion, embedding persistence and training.

use std::path::PathBuf;

/// Every failure in this crate is terminal for the run: nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// The configuration record is unusable (missing path, zero threads, ...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A graph line did not split into exactly two tab-separated fields.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// A coordinate in an embedding file could not be parsed as a float.
    #[error("invalid coordinate {value:?} at line {line}")]
    InvalidCoordinate { line: usize, value: String },

    /// An embedding file names a node that is not part of the graph.
    #[error("unknown node: {0:?}")]
    UnknownNode(String),

    /// The sampling table would contain no entries.
    #[error("negative sampling distribution is empty (no node has positive weight)")]
    EmptyDistribution,

    /// Some source has fewer sampleable non-neighbours than negatives per
    /// edge, so drawing distinct negatives for it would never finish.
    #[error("node {node:?} has {available} candidate negatives, {required} required")]
    SamplerExhaustion { node: String, available: usize, required: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EmbedError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, EmbedError>;
