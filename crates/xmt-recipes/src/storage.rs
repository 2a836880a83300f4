//! Recipe lookup by name.
//!
//! This module defines the [`RecipeStorage`] trait, the only way the composer
//! reaches outside itself. Two implementations are provided:
//!
//! - [`MemoryStorage`] keeps specifications in a map (tests, generated recipes)
//! - [`FileStorage`] reads YAML files from a list of search directories
//!
//! # Example: Implementing RecipeStorage
//!
//! ```ignore
//! use xmt_recipes::{RecipeError, RecipeResult, RecipeStorage, Spec};
//!
//! impl RecipeStorage for MyDatabase {
//!     fn load_recipe(&self, name: &str) -> RecipeResult<Spec> {
//!         self.fetch(name).ok_or_else(|| RecipeError::NotFound(name.to_string()))
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::config::StorageConfig;
use crate::error::{RecipeError, RecipeResult};
use crate::spec::Spec;

/// A source of recipe specifications.
///
/// Lookups are expected to be synchronous and free of side effects as far as
/// the composer is concerned. The composer does not cache; wrap a storage in
/// [`CachedStorage`](crate::CachedStorage) if lookups are expensive.
pub trait RecipeStorage {
    /// Loads the specification registered under `name`.
    ///
    /// Returns [`RecipeError::NotFound`] if there is none.
    fn load_recipe(&self, name: &str) -> RecipeResult<Spec>;
}

impl<S: RecipeStorage + ?Sized> RecipeStorage for &S {
    fn load_recipe(&self, name: &str) -> RecipeResult<Spec> {
        (**self).load_recipe(name)
    }
}

/// In-memory storage keyed by recipe name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    recipes: HashMap<String, Spec>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) a specification under `name`.
    pub fn insert(&mut self, name: impl Into<String>, spec: Spec) {
        self.recipes.insert(name.into(), spec);
    }

    /// Returns the stored specification without cloning.
    pub fn get(&self, name: &str) -> Option<&Spec> {
        self.recipes.get(name)
    }

    /// Returns a mutable reference to a stored specification.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Spec> {
        self.recipes.get_mut(name)
    }

    /// Returns the number of stored specifications.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl RecipeStorage for MemoryStorage {
    fn load_recipe(&self, name: &str) -> RecipeResult<Spec> {
        self.recipes
            .get(name)
            .cloned()
            .ok_or_else(|| RecipeError::NotFound(name.to_string()))
    }
}

impl<N: Into<String>> FromIterator<(N, Spec)> for MemoryStorage {
    fn from_iter<I: IntoIterator<Item = (N, Spec)>>(iter: I) -> Self {
        Self {
            recipes: iter.into_iter().map(|(n, s)| (n.into(), s)).collect(),
        }
    }
}

/// File-based storage reading YAML specifications.
///
/// A recipe named `intro` is looked up as `<path>/intro.yaml` in each
/// configured directory, first match wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    config: StorageConfig,
}

impl FileStorage {
    /// Creates a storage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Creates a storage searching only the current directory.
    pub fn current() -> Self {
        Self::new(StorageConfig::default())
    }

    /// Returns the storage configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the path `name` resolves to, if it exists.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let file_name = format!("{}{}", name, self.config.extension);
        self.config
            .paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    /// Writes `spec` as YAML into the first search directory.
    ///
    /// Returns the path written.
    pub fn write(&self, name: &str, spec: &Spec) -> RecipeResult<PathBuf> {
        let dir = self
            .config
            .paths
            .first()
            .ok_or_else(|| RecipeError::NotFound(name.to_string()))?;
        let path = dir.join(format!("{}{}", name, self.config.extension));
        let text = serde_yaml::to_string(spec).map_err(|e| RecipeError::Format {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        fs::write(&path, text).map_err(|e| RecipeError::io_error(&path, e))?;
        log::debug!("wrote recipe '{}' to {}", name, path.display());
        Ok(path)
    }
}

impl RecipeStorage for FileStorage {
    fn load_recipe(&self, name: &str) -> RecipeResult<Spec> {
        let path = self
            .locate(name)
            .ok_or_else(|| RecipeError::NotFound(format!("{}{}", name, self.config.extension)))?;
        log::debug!("loading recipe '{}' from {}", name, path.display());

        let text = fs::read_to_string(&path).map_err(|e| RecipeError::io_error(&path, e))?;
        serde_yaml::from_str(&text).map_err(|e| RecipeError::Format {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}
