//! Content items and read-only views over them.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// One unit of the assembled content sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    /// The literal value from the specification.
    pub content: Value,
    /// Annotation name to attached value.
    pub annotations: BTreeMap<String, Value>,
}

impl ContentItem {
    /// Creates an item with no annotations.
    pub fn new(content: Value) -> Self {
        Self {
            content,
            annotations: BTreeMap::new(),
        }
    }

    /// Attaches (or replaces) an annotation value.
    pub fn annotate(&mut self, name: impl Into<String>, value: Value) {
        self.annotations.insert(name.into(), value);
    }
}

/// Borrowed view of a [`ContentItem`] returned by recipe lookups.
///
/// # Example
///
/// ```ignore
/// let line = recipe.get(1)?;
/// assert_eq!(line.as_str(), Some("line1"));
/// assert_eq!(line.annotation("comment"), Some(&json!("first comment")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentWrapper<'a> {
    item: &'a ContentItem,
}

impl<'a> ContentWrapper<'a> {
    /// Wraps an item.
    pub fn new(item: &'a ContentItem) -> Self {
        Self { item }
    }

    /// The literal content value.
    pub fn content(&self) -> &'a Value {
        &self.item.content
    }

    /// The content as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&'a str> {
        self.item.content.as_str()
    }

    /// The value of an annotation, if attached.
    pub fn annotation(&self, name: &str) -> Option<&'a Value> {
        self.item.annotations.get(name)
    }

    /// Returns true if the annotation is attached.
    pub fn has_annotation(&self, name: &str) -> bool {
        self.item.annotations.contains_key(name)
    }

    /// Iterates over attached annotations in name order.
    pub fn annotations(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        let item = self.item;
        item.annotations
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// The underlying item.
    pub fn item(&self) -> &'a ContentItem {
        self.item
    }

    /// Flattens the item into a single mapping: `{"content": ..., <annotation>: ...}`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("content".to_string(), self.item.content.clone());
        for (name, value) in &self.item.annotations {
            map.insert(name.clone(), value.clone());
        }
        Value::Object(map)
    }
}

impl fmt::Display for ContentWrapper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item.content {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}
