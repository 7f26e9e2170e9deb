//! Error types for the extraction engine.
//!
//! Almost every failure is local to one sentence. Processors propagate these
//! with `?`; the dispatcher recovers [`ExtractError::MalformedChunk`] in place and
//! everything else surfaces at the statement boundary, where the sentence is
//! logged and emitted with its partial output.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// A processor received a chunk shape it cannot interpret.
    #[error("malformed chunk `{chunk}`: {reason}")]
    MalformedChunk { chunk: String, reason: &'static str },

    #[error("chunk index {0} is not part of this sentence")]
    UnknownChunk(usize),

    /// Nested re-dispatch went deeper than the engine allows.
    #[error("re-dispatch depth limit reached ({depth})")]
    RecursionLimit { depth: usize },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A collaborator panicked while the sentence was being processed.
    #[error("fault while extracting sentence: {0}")]
    Fault(String),
}

impl ExtractError {
    pub(crate) fn malformed(chunk: impl Into<String>, reason: &'static str) -> Self {
        ExtractError::MalformedChunk { chunk: chunk.into(), reason }
    }
}
