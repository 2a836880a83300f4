//! Error types for index-string parsing and resolution.

use thiserror::Error;

/// Errors that can occur while parsing or resolving an index string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Empty input provided.
    #[error("empty index expression")]
    Empty,

    /// Syntax error at a specific position in the input.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// Byte offset in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// Zero was used as an index; positions start at 1.
    #[error("zero is not a valid index; indexing starts from 1")]
    ZeroIndex,

    /// Index resolves outside `[1, total_len]`.
    #[error("index {index} is out of range for length {total_len}")]
    OutOfRange {
        /// The index as written.
        index: i64,
        /// Total length the index was resolved against.
        total_len: usize,
    },

    /// Range start resolves after its end.
    #[error("range start {start} is after range end {end}")]
    InvertedRange {
        /// Resolved start position.
        start: usize,
        /// Resolved end position.
        end: usize,
    },

    /// Step is zero or negative.
    #[error("range step must be positive, got {0}")]
    InvalidStep(i64),
}

/// Result type for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;
