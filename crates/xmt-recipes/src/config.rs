//! Configuration types for recipe composition and storage.

use std::path::PathBuf;
use std::time::Duration;

/// Default inclusion depth limit, the root recipe included.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for the recipe composer.
///
/// # Example
///
/// ```rust
/// use xmt_recipes::ComposeConfig;
///
/// let config = ComposeConfig::builder()
///     .with_compile_tags(false)
///     .with_max_depth(16)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Finalize the root recipe's tags into index collections.
    pub compile_tags: bool,
    /// Maximum inclusion depth, the root recipe included.
    ///
    /// Defaults to [`DEFAULT_MAX_DEPTH`]. Inclusion recurses on the native
    /// stack, so `None` (limited only by cycle detection) lets a deep enough
    /// acyclic chain overflow it.
    pub max_depth: Option<usize>,
    /// Reject specifications whose kind is not `static`.
    pub enforce_kind: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            compile_tags: true,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            enforce_kind: true,
        }
    }
}

impl ComposeConfig {
    /// Creates a new builder for ComposeConfig.
    pub fn builder() -> ComposeConfigBuilder {
        ComposeConfigBuilder::default()
    }
}

/// Builder for ComposeConfig.
#[derive(Debug, Clone, Default)]
pub struct ComposeConfigBuilder {
    config: ComposeConfig,
}

impl ComposeConfigBuilder {
    /// Enables or disables tag finalization for the root recipe.
    pub fn with_compile_tags(mut self, compile_tags: bool) -> Self {
        self.config.compile_tags = compile_tags;
        self
    }

    /// Sets the maximum inclusion depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = Some(max_depth);
        self
    }

    /// Removes the inclusion depth limit.
    pub fn without_max_depth(mut self) -> Self {
        self.config.max_depth = None;
        self
    }

    /// Enables or disables the `static` kind check.
    pub fn with_enforce_kind(mut self, enforce_kind: bool) -> Self {
        self.config.enforce_kind = enforce_kind;
        self
    }

    /// Builds the ComposeConfig.
    pub fn build(self) -> ComposeConfig {
        self.config
    }
}

/// Configuration for [`FileStorage`](crate::FileStorage).
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directories searched in order.
    pub paths: Vec<PathBuf>,
    /// Extension appended to recipe names (including the dot).
    pub extension: String,
}

impl StorageConfig {
    /// Creates a config searching `paths` for `.yaml` files.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            extension: ".yaml".to_string(),
        }
    }

    /// Sets the extension appended to recipe names.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(["."])
    }
}

/// Configuration for [`CachedStorage`](crate::CachedStorage).
///
/// # Example
///
/// ```rust
/// use xmt_recipes::CacheConfig;
/// use std::time::Duration;
///
/// let cache = CacheConfig {
///     max_entries: 256,
///     ttl: Duration::from_secs(60),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached specifications.
    pub max_entries: usize,
    /// Time-to-live for cached entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(300),
        }
    }
}
