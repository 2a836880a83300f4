//! Inclusion stack for cycle detection.

use crate::error::{RecipeError, RecipeResult};

/// Identifiers of the recipes currently being composed, outermost first.
///
/// One stack is created per root composition and threaded through every
/// nested inclusion. An identifier is pushed when its recipe starts composing
/// and popped when that branch finishes, so two siblings sharing a dependency
/// are not mistaken for a cycle.
#[derive(Debug, Clone, Default)]
pub(crate) struct InclusionStack {
    ids: Vec<String>,
    entered: usize,
    max_depth: usize,
}

impl InclusionStack {
    /// Creates an empty stack.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pushes `id`, failing if it is already being composed.
    pub(crate) fn enter(&mut self, id: &str) -> RecipeResult<()> {
        if self.contains(id) {
            let mut chain = self.ids.clone();
            chain.push(id.to_string());
            return Err(RecipeError::CyclicDependency {
                id: id.to_string(),
                chain,
            });
        }
        self.ids.push(id.to_string());
        self.entered += 1;
        self.max_depth = self.max_depth.max(self.ids.len());
        Ok(())
    }

    /// Pops `id`, which must be the innermost entry.
    pub(crate) fn leave(&mut self, id: &str) {
        let popped = self.ids.pop();
        debug_assert_eq!(popped.as_deref(), Some(id), "unbalanced inclusion stack");
    }

    /// Returns true if `id` is currently being composed.
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|entry| entry == id)
    }

    /// Current nesting depth.
    pub(crate) fn depth(&self) -> usize {
        self.ids.len()
    }

    /// Number of recipes entered so far.
    pub(crate) fn entered(&self) -> usize {
        self.entered
    }

    /// Deepest nesting reached so far.
    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }
}
