//! Error types
//!
//! Every failure in the engine is local: a bad range drops one selection or one
//! stored annotation, never the document. The enums here are what the library
//! returns; the binary wraps them in [`Error`].

use crate::registry::SentenceId;
use thiserror::Error;

/// Failures constructing, serializing or resolving a [`Range`](crate::range::Range)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Offsets that cannot describe a span
    #[error("invalid range in sentence {sentence}: end offset {end} precedes start offset {start}")]
    Invalid {
        sentence: SentenceId,
        start: usize,
        end: usize,
    },

    /// Segments out of document order
    #[error("invalid range: {0}")]
    Unordered(String),

    /// An offset past the end of its sentence
    #[error("invalid range: offset {offset} is past the end of sentence {sentence} ({len} characters)")]
    OutOfBounds {
        sentence: SentenceId,
        offset: usize,
        len: usize,
    },

    /// A stored boundary refers to content that no longer exists
    #[error("stale range: sentence {sentence} has no position {child}:{offset}")]
    StaleBoundary {
        sentence: SentenceId,
        child: usize,
        offset: usize,
    },

    /// A stored boundary refers to a sentence that no longer exists
    #[error("stale range: sentence {0} is no longer in the document")]
    Stale(SentenceId),

    /// The serialized form could not be parsed
    #[error("malformed range `{input}`: {reason}")]
    Malformed { input: String, reason: String },
}

impl RangeError {
    /// True for the errors caused by the document changing under a stored range
    pub fn is_stale(&self) -> bool {
        matches!(self, RangeError::Stale(_) | RangeError::StaleBoundary { .. })
    }
}

/// Failures loading an article
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read article: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid article JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid article YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown article format `{0}` (expected json or yaml)")]
    UnknownFormat(String),
}

/// Failures reading or writing persisted annotations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("annotation store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("annotation store holds invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-level error used by the binary
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] precis_config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
