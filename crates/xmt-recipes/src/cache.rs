//! Caching wrapper for recipe storages.
//!
//! The composer looks a recipe up every time it is included, so a recipe that
//! is shared by many others is loaded many times. [`CachedStorage`] keeps
//! recently loaded specifications in an LRU cache with TTL expiration.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;
use crate::error::RecipeResult;
use crate::spec::Spec;
use crate::storage::RecipeStorage;

/// A cached specification with expiration tracking.
#[derive(Debug, Clone)]
struct CacheEntry {
    spec: Spec,
    created_at: Instant,
}

impl CacheEntry {
    fn new(spec: Spec) -> Self {
        Self {
            spec,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// LRU cache with TTL expiration in front of another [`RecipeStorage`].
///
/// Only successful lookups are cached; failures are passed through and
/// retried against the inner storage on the next request.
///
/// # Example
///
/// ```ignore
/// use xmt_recipes::{CacheConfig, CachedStorage, FileStorage, RecipeComposer};
///
/// let storage = CachedStorage::new(FileStorage::current(), CacheConfig::default());
/// let composer = RecipeComposer::new(&storage);
/// let recipe = composer.compose_by_name("book")?;
/// println!("{} lookups served from cache", storage.stats().hits);
/// ```
pub struct CachedStorage<S> {
    inner: S,
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<S: RecipeStorage> CachedStorage<S> {
    /// Wraps `inner` with a cache configured by `config`.
    pub fn new(inner: S, config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Returns the wrapped storage.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Drops the cached entry for `name`, if any.
    pub fn invalidate(&self, name: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.pop(name);
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total, expired) = match self.entries.lock() {
            Ok(entries) => (
                entries.len(),
                entries
                    .iter()
                    .filter(|(_, entry)| entry.is_expired(self.ttl))
                    .count(),
            ),
            _ => (0, 0),
        };
        CacheStats {
            total_entries: total,
            valid_entries: total.saturating_sub(expired),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn cached(&self, name: &str) -> Option<Spec> {
        let mut entries = self.entries.lock().ok()?;
        if let Some(entry) = entries.get(name) {
            if entry.is_expired(self.ttl) {
                entries.pop(name);
                return None;
            }
            return Some(entry.spec.clone());
        }
        None
    }
}

impl<S: RecipeStorage> RecipeStorage for CachedStorage<S> {
    fn load_recipe(&self, name: &str) -> RecipeResult<Spec> {
        if let Some(spec) = self.cached(name) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("recipe cache hit for '{}'", name);
            return Ok(spec);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let spec = self.inner.load_recipe(name)?;
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.put(name.to_string(), CacheEntry::new(spec.clone()));
            }
            Err(_) => log::warn!("recipe cache lock poisoned, '{}' not cached", name),
        }
        Ok(spec)
    }
}

impl<S> std::fmt::Debug for CachedStorage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("CachedStorage")
            .field("entries", &entries)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Statistics about a [`CachedStorage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries in the cache.
    pub total_entries: usize,
    /// Number of entries that have not expired.
    pub valid_entries: usize,
    /// Lookups served from the cache.
    pub hits: usize,
    /// Lookups forwarded to the inner storage.
    pub misses: usize,
}
