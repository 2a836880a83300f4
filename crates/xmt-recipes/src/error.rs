//! Error types for recipe composition.

use std::path::PathBuf;

use thiserror::Error;
use xmt_index::Position;

/// Errors that can occur while loading, composing or querying a recipe.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Index-string parse or validation error from `xmt-index`.
    #[error("index string error: {0}")]
    Parse(#[from] xmt_index::IndexError),

    /// The specification is malformed.
    #[error("invalid specification '{id}': {message}")]
    Specification {
        /// Identifier of the offending specification.
        id: String,
        /// Description of the problem.
        message: String,
    },

    /// A referenced specification cannot be found in storage.
    #[error("recipe not found: {0}")]
    NotFound(String),

    /// A specification (transitively) includes itself.
    #[error("circular dependency detected: {id} ultimately includes itself ({})", .chain.join(" -> "))]
    CyclicDependency {
        /// Identifier that was found twice.
        id: String,
        /// Inclusion chain leading back to `id`.
        chain: Vec<String>,
    },

    /// The specification's kind cannot be composed statically.
    #[error("unsupported recipe type '{kind}' for '{id}'")]
    UnsupportedKind {
        /// Identifier of the specification.
        id: String,
        /// The declared kind.
        kind: String,
    },

    /// Inclusion nesting exceeds the configured limit.
    #[error("inclusion depth limit {limit} exceeded at '{id}'")]
    DepthExceeded {
        /// Identifier that would have exceeded the limit.
        id: String,
        /// Configured limit.
        limit: usize,
    },

    /// Lookup position outside the content sequence.
    #[error("position {position} is out of range for {len} content items")]
    PositionOutOfRange {
        /// Requested 1-based position.
        position: Position,
        /// Number of content items.
        len: usize,
    },

    /// Tags were requested but never compiled.
    #[error("tags have not been compiled")]
    TagsNotCompiled,

    /// Requested tag does not exist.
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// I/O error while reading a specification file.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A specification file could not be decoded.
    #[error("could not decode recipe '{name}': {message}")]
    Format {
        /// Name the recipe was requested under.
        name: String,
        /// Decoder message.
        message: String,
    },
}

impl RecipeError {
    /// Creates a specification error.
    pub fn specification(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Specification {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for recipe operations.
pub type RecipeResult<T> = std::result::Result<T, RecipeError>;
