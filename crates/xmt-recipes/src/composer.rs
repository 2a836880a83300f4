//! Recipe composer implementation.

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::Value;
use xmt_index::Position;

use crate::config::ComposeConfig;
use crate::content::ContentItem;
use crate::error::{RecipeError, RecipeResult};
use crate::recipe::{CompositionStats, Recipe};
use crate::spec::{AnnotationEntry, AnnotationValue, ContentEntry, MarkerKind, Spec, STATIC_KIND};
use crate::stack::InclusionStack;
use crate::storage::RecipeStorage;

/// Main composition engine.
///
/// The composer turns a [`Spec`] into a [`Recipe`]: it assembles the content
/// sequence (recursively splicing in included recipes fetched from a
/// [`RecipeStorage`]), resolves tags, optionally compiles them into
/// index collections and applies annotations.
///
/// # Example
///
/// ```ignore
/// use xmt_recipes::{MemoryStorage, RecipeComposer};
///
/// let storage = MemoryStorage::new();
/// // ... insert specifications ...
///
/// let composer = RecipeComposer::new(&storage);
/// let recipe = composer.compose_by_name("basic")?;
///
/// let first = recipe.tag("first")?;
/// println!("{} items tagged 'first'", first.len());
/// ```
pub struct RecipeComposer<'a> {
    /// Where included recipes are looked up.
    storage: &'a dyn RecipeStorage,
    /// Composer configuration.
    config: ComposeConfig,
}

/// Working state for one specification.
#[derive(Default)]
struct Assembly {
    content: Vec<ContentItem>,
    raw_tags: BTreeMap<String, Vec<Position>>,
    markers: Vec<PendingMarker>,
}

/// A marker seen during content assembly, resolved once the length is known.
struct PendingMarker {
    offset: usize,
    kind: String,
    tag: String,
}

impl<'a> RecipeComposer<'a> {
    /// Creates a composer with default configuration.
    pub fn new(storage: &'a dyn RecipeStorage) -> Self {
        Self::with_config(storage, ComposeConfig::default())
    }

    /// Creates a composer with custom configuration.
    pub fn with_config(storage: &'a dyn RecipeStorage, config: ComposeConfig) -> Self {
        Self { storage, config }
    }

    /// Returns a reference to the composer configuration.
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Composes a specification.
    ///
    /// `spec` is never modified. Every call starts with a fresh inclusion
    /// stack. On failure nothing is returned but the innermost error.
    pub fn compose(&self, spec: &Spec) -> RecipeResult<Recipe> {
        let start = Instant::now();
        let mut stack = InclusionStack::new();

        log::debug!("composing recipe '{}'", spec.id());
        let mut recipe = self.compose_nested(spec, &mut stack, self.config.compile_tags)?;
        recipe.stats = CompositionStats::new(start.elapsed(), stack.entered(), stack.max_depth());

        log::debug!(
            "composed recipe '{}': {} items, {} tags, {} recipes in {:?}",
            spec.id(),
            recipe.len(),
            recipe.raw_tags().len(),
            recipe.stats.recipes_composed,
            recipe.stats.duration
        );
        Ok(recipe)
    }

    /// Loads the specification registered under `name` and composes it.
    pub fn compose_by_name(&self, name: &str) -> RecipeResult<Recipe> {
        let spec = self.storage.load_recipe(name)?;
        self.compose(&spec)
    }

    /// Composes `spec` as part of the call tree tracked by `stack`.
    ///
    /// The identifier is popped again whether or not composition succeeds.
    fn compose_nested(
        &self,
        spec: &Spec,
        stack: &mut InclusionStack,
        compile_tags: bool,
    ) -> RecipeResult<Recipe> {
        let id = spec.id();
        if self.config.enforce_kind && spec.metadata.kind != STATIC_KIND {
            return Err(RecipeError::UnsupportedKind {
                id: id.to_string(),
                kind: spec.metadata.kind.clone(),
            });
        }
        if let Some(limit) = self.config.max_depth {
            if stack.depth() >= limit {
                return Err(RecipeError::DepthExceeded {
                    id: id.to_string(),
                    limit,
                });
            }
        }

        stack.enter(id)?;
        let result = self.assemble(spec, stack, compile_tags);
        stack.leave(id);
        result
    }

    fn assemble(
        &self,
        spec: &Spec,
        stack: &mut InclusionStack,
        compile_tags: bool,
    ) -> RecipeResult<Recipe> {
        let mut assembly = Assembly::default();
        self.process_content(spec, stack, &mut assembly)?;
        process_tags(spec, &mut assembly)?;

        let mut recipe = Recipe::new(spec.metadata.clone(), assembly.content, assembly.raw_tags);
        if compile_tags {
            recipe.compile_tags();
        }
        process_annotations(spec, &mut recipe.content)?;
        Ok(recipe)
    }

    fn process_content(
        &self,
        spec: &Spec,
        stack: &mut InclusionStack,
        assembly: &mut Assembly,
    ) -> RecipeResult<()> {
        for entry in &spec.content {
            match entry {
                ContentEntry::Include { include } => self.include(include, stack, assembly)?,
                ContentEntry::Marker { tag, with } => assembly.markers.push(PendingMarker {
                    offset: assembly.content.len(),
                    kind: tag.clone(),
                    tag: with.clone(),
                }),
                ContentEntry::Literal(Value::Object(_)) => {
                    return Err(RecipeError::specification(
                        spec.id(),
                        "unrecognized special content marker",
                    ));
                }
                ContentEntry::Literal(value) => assembly.content.push(ContentItem::new(value.clone())),
            }
        }
        Ok(())
    }

    /// Splices the recipe registered under `name` into `assembly`.
    ///
    /// Included tags are merged with every position shifted by the content
    /// length before the inclusion.
    fn include(
        &self,
        name: &str,
        stack: &mut InclusionStack,
        assembly: &mut Assembly,
    ) -> RecipeResult<()> {
        let offset = assembly.content.len();
        let spec = self.storage.load_recipe(name)?;
        let child = self.compose_nested(&spec, stack, false)?;
        log::trace!(
            "including '{}' ({} items) at offset {}",
            name,
            child.len(),
            offset
        );

        assembly.content.extend(child.content);
        for (tag, positions) in child.raw_tags {
            assembly
                .raw_tags
                .entry(tag)
                .or_default()
                .extend(positions.into_iter().map(|p| p + offset));
        }
        Ok(())
    }
}

/// Merges explicit tag definitions and positional markers into the raw tags,
/// then sorts and deduplicates every tag.
fn process_tags(spec: &Spec, assembly: &mut Assembly) -> RecipeResult<()> {
    let total_len = assembly.content.len();

    for (name, value) in &spec.tags {
        let positions = value.resolve(total_len)?;
        assembly
            .raw_tags
            .entry(name.clone())
            .or_default()
            .extend(positions);
    }

    for marker in &assembly.markers {
        let kind = MarkerKind::parse(&marker.kind).ok_or_else(|| {
            RecipeError::specification(
                spec.id(),
                format!("invalid special marker '{}'", marker.kind),
            )
        })?;
        let positions = assembly.raw_tags.entry(marker.tag.clone()).or_default();
        match kind {
            MarkerKind::Preceding => positions.extend(1..=marker.offset),
            MarkerKind::Subsequent => positions.extend(marker.offset.max(1)..=total_len),
        }
    }

    for positions in assembly.raw_tags.values_mut() {
        positions.sort_unstable();
        positions.dedup();
    }
    Ok(())
}

/// Attaches every annotation of `spec` to `content`.
fn process_annotations(spec: &Spec, content: &mut [ContentItem]) -> RecipeResult<()> {
    let len = content.len();
    let out_of_range = |name: &str, position: Position| {
        RecipeError::specification(
            spec.id(),
            format!(
                "annotation '{}' targets position {} but there are {} items",
                name, position, len
            ),
        )
    };

    for (name, raw) in &spec.annotations {
        let value = AnnotationValue::from_value(raw).map_err(|message| {
            RecipeError::specification(spec.id(), format!("annotation '{}': {}", name, message))
        })?;

        match value {
            AnnotationValue::Sequence(entries) => {
                // Index of the next item to write.
                let mut cursor = 0usize;
                for entry in entries {
                    match entry {
                        AnnotationEntry::Jump(position) => cursor = position - 1,
                        AnnotationEntry::Value(value) => {
                            let item = content
                                .get_mut(cursor)
                                .ok_or_else(|| out_of_range(name.as_str(), cursor + 1))?;
                            item.annotate(name.as_str(), value);
                            cursor += 1;
                        }
                    }
                }
            }
            AnnotationValue::Positions(entries) => {
                for (position, value) in entries {
                    let item = content
                        .get_mut(position - 1)
                        .ok_or_else(|| out_of_range(name.as_str(), position))?;
                    item.annotate(name.as_str(), value);
                }
            }
        }
    }
    Ok(())
}
