//! Typed failures that callers branch on
//!
//! Everything else travels as `anyhow::Error`. These variants exist because the
//! tool surface and the CLI need to tell "you asked wrong" apart from "the disk
//! is gone".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    /// Missing or malformed caller input. Nothing was executed.
    #[error("{0}")]
    InvalidInput(String),

    /// An embedding disagrees with the dimension already present in the store.
    ///
    /// Usually means the embedding model changed under an existing log.
    #[error("embedding dimension mismatch: store holds {expected}-dim vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl GuardError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
