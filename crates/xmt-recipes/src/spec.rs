//! Declarative recipe specifications.
//!
//! A [`Spec`] is the input to composition. It is usually decoded from a
//! structured text format by a [`RecipeStorage`](crate::RecipeStorage), but
//! can equally be built in code.
//!
//! ```yaml
//! metadata:
//!   id: intro
//!   type: static
//!   name: Introduction
//! content:
//!   - first line
//!   - include: greeting
//!   - tag: subsequent
//!     with: body
//!   - last line
//! tags:
//!   all: "1..-1"
//!   first: 1
//!   ends: [1, -1]
//! annotations:
//!   comment: [opening, {jump: 4}, closing]
//!   speaker: {2: narrator}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use xmt_index::{parse_index_string, resolve_index, IndexResult, Position};

/// The kind of specification this crate composes.
pub const STATIC_KIND: &str = "static";

/// A recipe specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    /// Identification of the recipe.
    pub metadata: Metadata,
    /// Ordered literal items and directives.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentEntry>,
    /// Tag name to tag definition.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeMap<String, TagValue>,
    /// Annotation name to annotation definition (list or position mapping).
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, Value>,
}

/// Recipe metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Identifier used for cycle detection.
    pub id: String,
    /// Recipe kind (`static` for everything this crate composes).
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// One entry of a specification's `content` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentEntry {
    /// `{include: name}`: splice in another recipe.
    Include {
        /// Name to look the recipe up under.
        include: String,
    },
    /// `{tag: kind, with: tag_name}`: positional tag marker.
    Marker {
        /// Marker kind (`preceding` or `subsequent`).
        tag: String,
        /// Tag receiving the positions.
        with: String,
    },
    /// Anything else. Mappings here are rejected during composition.
    Literal(Value),
}

/// Positional tag marker kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Every position before the marker.
    Preceding,
    /// The position before the marker and everything after it.
    Subsequent,
}

/// A tag definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// A single index: `first: 1`
    Singleton(i64),
    /// Explicit indices: `ends: [1, -1]`
    List(Vec<i64>),
    /// An index string: `all: "1..-1"`
    Expression(String),
}

/// A decoded annotation definition.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// Values walked onto consecutive positions.
    Sequence(Vec<AnnotationEntry>),
    /// Values attached to explicit 1-based positions.
    Positions(Vec<(Position, Value)>),
}

/// One entry of a sequence annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEntry {
    /// `{jump: n}`: continue writing at position `n`.
    Jump(Position),
    /// A value for the current position.
    Value(Value),
}

impl Spec {
    /// Creates an empty specification.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            content: Vec::new(),
            tags: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Returns the recipe identifier.
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Appends a content entry.
    pub fn with_entry(mut self, entry: ContentEntry) -> Self {
        self.content.push(entry);
        self
    }

    /// Adds a tag definition.
    pub fn with_tag(mut self, name: impl Into<String>, value: TagValue) -> Self {
        self.tags.insert(name.into(), value);
        self
    }

    /// Adds an annotation definition.
    pub fn with_annotation(mut self, name: impl Into<String>, value: Value) -> Self {
        self.annotations.insert(name.into(), value);
        self
    }
}

impl Metadata {
    /// Creates metadata with an empty name and description.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: String::new(),
            description: String::new(),
        }
    }
}

impl ContentEntry {
    /// A literal content item.
    pub fn literal(value: impl Into<Value>) -> Self {
        ContentEntry::Literal(value.into())
    }

    /// An include directive.
    pub fn include(name: impl Into<String>) -> Self {
        ContentEntry::Include {
            include: name.into(),
        }
    }

    /// A positional tag marker.
    pub fn marker(kind: MarkerKind, tag: impl Into<String>) -> Self {
        ContentEntry::Marker {
            tag: kind.as_str().to_string(),
            with: tag.into(),
        }
    }
}

impl MarkerKind {
    /// Parses a marker kind as written in a specification.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "preceding" => Some(MarkerKind::Preceding),
            "subsequent" => Some(MarkerKind::Subsequent),
            _ => None,
        }
    }

    /// The written form of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Preceding => "preceding",
            MarkerKind::Subsequent => "subsequent",
        }
    }
}

impl TagValue {
    /// Resolves the definition against `total_len`.
    ///
    /// Integers go through the same validation as index strings, so negative
    /// values count from the end and `0` is rejected.
    pub fn resolve(&self, total_len: usize) -> IndexResult<Vec<Position>> {
        match self {
            TagValue::Singleton(index) => Ok(vec![resolve_index(*index, total_len)?]),
            TagValue::List(indices) => indices
                .iter()
                .map(|&index| resolve_index(index, total_len))
                .collect(),
            TagValue::Expression(expr) => parse_index_string(expr, total_len),
        }
    }
}

impl From<&str> for TagValue {
    fn from(expr: &str) -> Self {
        TagValue::Expression(expr.to_string())
    }
}

impl From<i64> for TagValue {
    fn from(index: i64) -> Self {
        TagValue::Singleton(index)
    }
}

impl From<Vec<i64>> for TagValue {
    fn from(indices: Vec<i64>) -> Self {
        TagValue::List(indices)
    }
}

impl AnnotationValue {
    /// Decodes an annotation definition.
    ///
    /// Lists become [`Sequence`](Self::Sequence); mappings become
    /// [`Positions`](Self::Positions) and their keys must be positive
    /// integers. Anything else is rejected with a description of the problem.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Array(entries) => entries
                .iter()
                .map(AnnotationEntry::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(AnnotationValue::Sequence),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| {
                    parse_position(key)
                        .map(|position| (position, value.clone()))
                        .ok_or_else(|| format!("annotation key '{}' is not a position", key))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(AnnotationValue::Positions),
            other => Err(format!(
                "annotation must be a list or a mapping, got {}",
                value_kind(other)
            )),
        }
    }
}

impl AnnotationEntry {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value.get("jump") {
            Some(target) => target
                .as_u64()
                .filter(|&p| p >= 1)
                .map(|p| AnnotationEntry::Jump(p as Position))
                .ok_or_else(|| format!("jump target {} is not a position", target)),
            None => Ok(AnnotationEntry::Value(value.clone())),
        }
    }
}

fn parse_position(key: &str) -> Option<Position> {
    key.trim().parse::<Position>().ok().filter(|&p| p >= 1)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Treats an explicit `null` section the same as a missing one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
