//! Composed recipes and lookups over them.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde_json::Value;
use xmt_index::{IndexCollection, Position};

use crate::content::{ContentItem, ContentWrapper};
use crate::error::{RecipeError, RecipeResult};
use crate::spec::Metadata;

/// The result of composing a specification.
///
/// Holds the flat content sequence, the raw tag membership and, once
/// compiled, the tags as [`IndexCollection`]s. All lookups are 1-based.
///
/// # Example
///
/// ```ignore
/// let recipe = composer.compose(&spec)?;
///
/// println!("{} lines", recipe.len());
/// let first = recipe.get(1)?;
///
/// let wanted = recipe.tag("first")? | recipe.tag("last_two")?;
/// for line in recipe.select(&wanted)? {
///     println!("{}", line);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Recipe {
    pub(crate) metadata: Metadata,
    pub(crate) content: Vec<ContentItem>,
    pub(crate) raw_tags: BTreeMap<String, Vec<Position>>,
    pub(crate) tags: Option<BTreeMap<String, IndexCollection>>,
    pub(crate) stats: CompositionStats,
}

/// Statistics from a composition.
#[derive(Debug, Clone, Default)]
pub struct CompositionStats {
    /// Total composition duration.
    pub duration: Duration,
    /// Number of recipes composed, the root included.
    pub recipes_composed: usize,
    /// Deepest inclusion nesting reached (the root alone is 1).
    pub max_depth: usize,
}

impl CompositionStats {
    /// Creates new composition stats.
    pub fn new(duration: Duration, recipes_composed: usize, max_depth: usize) -> Self {
        Self {
            duration,
            recipes_composed,
            max_depth,
        }
    }
}

impl Recipe {
    pub(crate) fn new(
        metadata: Metadata,
        content: Vec<ContentItem>,
        raw_tags: BTreeMap<String, Vec<Position>>,
    ) -> Self {
        Self {
            metadata,
            content,
            raw_tags,
            tags: None,
            stats: CompositionStats::default(),
        }
    }

    /// Returns the recipe metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the recipe identifier.
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Returns the number of content items.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns true if there is no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the content items in order.
    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    /// Returns the literal content values in order, without annotations.
    pub fn contents(&self) -> Vec<&Value> {
        self.content.iter().map(|item| &item.content).collect()
    }

    /// Iterates over wrapped content items in order.
    pub fn iter(&self) -> impl Iterator<Item = ContentWrapper<'_>> {
        self.content.iter().map(ContentWrapper::new)
    }

    /// Returns the item at a 1-based position.
    pub fn get(&self, position: Position) -> RecipeResult<ContentWrapper<'_>> {
        position
            .checked_sub(1)
            .and_then(|i| self.content.get(i))
            .map(ContentWrapper::new)
            .ok_or(RecipeError::PositionOutOfRange {
                position,
                len: self.content.len(),
            })
    }

    /// Returns the items in an inclusive, 1-based range.
    ///
    /// An empty range (`start > end`) yields no items.
    pub fn range(&self, range: RangeInclusive<Position>) -> RecipeResult<Vec<ContentWrapper<'_>>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let (start, end) = range.into_inner();
        if start == 0 {
            return Err(self.out_of_range(start));
        }
        if end > self.content.len() {
            return Err(self.out_of_range(end));
        }
        Ok(self.content[start - 1..end]
            .iter()
            .map(ContentWrapper::new)
            .collect())
    }

    /// Returns a compiled tag by name.
    pub fn tag(&self, name: &str) -> RecipeResult<&IndexCollection> {
        self.tags
            .as_ref()
            .ok_or(RecipeError::TagsNotCompiled)?
            .get(name)
            .ok_or_else(|| RecipeError::TagNotFound(name.to_string()))
    }

    /// Returns every compiled tag, or `None` if tags were not compiled.
    pub fn tags(&self) -> Option<&BTreeMap<String, IndexCollection>> {
        self.tags.as_ref()
    }

    /// Returns the sorted, deduplicated positions of every tag.
    ///
    /// Available whether or not tags were compiled.
    pub fn raw_tags(&self) -> &BTreeMap<String, Vec<Position>> {
        &self.raw_tags
    }

    /// Returns the raw positions of one tag.
    pub fn raw_tag(&self, name: &str) -> Option<&[Position]> {
        self.raw_tags.get(name).map(Vec::as_slice)
    }

    /// Returns the items at each position of `positions`, in its order.
    pub fn select(&self, positions: &IndexCollection) -> RecipeResult<Vec<ContentWrapper<'_>>> {
        positions.iter().map(|p| self.get(p)).collect()
    }

    /// Returns true if tags have been compiled.
    pub fn is_compiled(&self) -> bool {
        self.tags.is_some()
    }

    /// Wraps every raw tag into a named [`IndexCollection`] over the content.
    ///
    /// Compiling again rebuilds the collections from the raw tags.
    pub fn compile_tags(&mut self) {
        let total_len = self.content.len();
        let tags = self
            .raw_tags
            .iter()
            .map(|(name, positions)| {
                (
                    name.clone(),
                    IndexCollection::named(positions.clone(), total_len, name.as_str()),
                )
            })
            .collect();
        self.tags = Some(tags);
    }

    /// Returns statistics from the composition that produced this recipe.
    pub fn stats(&self) -> &CompositionStats {
        &self.stats
    }

    fn out_of_range(&self, position: Position) -> RecipeError {
        RecipeError::PositionOutOfRange {
            position,
            len: self.content.len(),
        }
    }
}
