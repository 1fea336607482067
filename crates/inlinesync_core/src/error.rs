//! Error types for the delta buffer and inline range handling.
use crate::range::InlineRange;
use thiserror::Error;

/// Top-level synchronization error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Invalid inline range {range:?} for buffer of length {len}")]
    InvalidInlineRange { range: InlineRange, len: usize },

    #[error("Index {index} is out of bounds for buffer of length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("Editor has no root element")]
    NoRoot,

    #[error("Root element is detached from the document")]
    Detached,

    #[error("Script error: {0}")]
    Script(String),
}
