//! # xmt-recipes
//!
//! Static recipe composition.
//!
//! A recipe is an ordered sequence of content items assembled from a
//! declarative [`Spec`]. Specifications can include other recipes by name,
//! tag positions of the final sequence (with index strings from
//! [`xmt-index`] or with positional markers) and attach named annotations
//! to individual items.
//!
//! ## Quick Start
//!
//! ```ignore
//! use xmt_recipes::{FileStorage, RecipeComposer, StorageConfig};
//!
//! let storage = FileStorage::new(StorageConfig::new(["recipes"]));
//! let composer = RecipeComposer::new(&storage);
//!
//! let recipe = composer.compose_by_name("intro")?;
//! for item in recipe.select(recipe.tag("first")?)? {
//!     println!("{} ({:?})", item, item.annotation("comment"));
//! }
//! ```
//!
//! ## With Configuration
//!
//! ```ignore
//! use xmt_recipes::{CacheConfig, CachedStorage, ComposeConfig, FileStorage, RecipeComposer};
//!
//! let storage = CachedStorage::new(FileStorage::current(), CacheConfig::default());
//! let config = ComposeConfig::builder()
//!     .with_max_depth(16)
//!     .with_compile_tags(false)
//!     .build();
//!
//! let composer = RecipeComposer::with_config(&storage, config);
//! let mut recipe = composer.compose_by_name("book")?;
//! recipe.compile_tags();
//! ```
//!
//! ## Content Directives
//!
//! | Entry | Example | Effect |
//! |-------|---------|--------|
//! | Literal | `"a line"` | Appended as one item |
//! | Include | `{include: other}` | Splices in the composed `other` recipe |
//! | Preceding marker | `{tag: preceding, with: head}` | Tags every item before the marker |
//! | Subsequent marker | `{tag: subsequent, with: body}` | Tags the item before the marker and all after it |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      xmt-recipes                          │
//! │                                                           │
//! │  RecipeComposer                                           │
//! │  ├── load included specs (via RecipeStorage trait)        │
//! │  ├── splice content, shift included tags by offset        │
//! │  ├── resolve tag definitions and markers (xmt-index)      │
//! │  ├── apply annotations                                    │
//! │  └── return Recipe with stats                             │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod composer;
mod config;
mod content;
mod error;
mod recipe;
mod spec;
mod stack;
mod storage;

// Public re-exports
pub use cache::{CacheStats, CachedStorage};
pub use composer::RecipeComposer;
pub use config::{
    CacheConfig, ComposeConfig, ComposeConfigBuilder, StorageConfig, DEFAULT_MAX_DEPTH,
};
pub use content::{ContentItem, ContentWrapper};
pub use error::{RecipeError, RecipeResult};
pub use recipe::{CompositionStats, Recipe};
pub use spec::{
    AnnotationEntry, AnnotationValue, ContentEntry, MarkerKind, Metadata, Spec, TagValue,
    STATIC_KIND,
};
pub use storage::{FileStorage, MemoryStorage, RecipeStorage};

// Re-export commonly used types from dependencies for convenience
pub use xmt_index::{parse_index_string, IndexCollection, Position};
