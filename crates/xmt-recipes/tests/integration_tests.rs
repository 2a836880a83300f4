//! End-to-end composition tests.
//!
//! These tests cover inclusion, tagging and annotation across recipes, and
//! composition through the file-backed and cached storages.

use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;
use xmt_recipes::{
    CacheConfig, CachedStorage, ComposeConfig, ContentEntry, FileStorage, IndexCollection,
    MemoryStorage, RecipeComposer, RecipeError, RecipeStorage, Spec, StorageConfig, TagValue,
    DEFAULT_MAX_DEPTH,
};

fn spec(value: Value) -> Spec {
    serde_json::from_value(value).unwrap()
}

/// The three-line recipe most scenarios build on.
fn basic() -> Spec {
    spec(json!({
        "metadata": {"name": "Test static recipe", "type": "static", "id": "sta"},
        "content": ["line1", "line2", "line3"],
        "tags": {"all": "1..3", "first": "1", "last_two": "2,3"},
        "annotations": {"comment": ["first comment", "second comment", "third comment"]}
    }))
}

/// A copy of [`basic`] under another identifier, with an extra annotation.
fn dependency() -> Spec {
    let mut dep = basic().with_annotation(
        "extra-comment",
        json!(["extra first", "extra second", "extra third"]),
    );
    dep.metadata.id = "dep".to_string();
    dep
}

fn lines(recipe: &xmt_recipes::Recipe) -> Vec<String> {
    recipe.iter().map(|item| item.to_string()).collect()
}

// ============================================================================
// Simple recipes
// ============================================================================

#[test]
fn test_simple_tags() {
    let storage = MemoryStorage::new();
    let recipe = RecipeComposer::new(&storage).compose(&basic()).unwrap();

    assert_eq!(lines(&recipe), vec!["line1", "line2", "line3"]);
    assert_eq!(recipe.tag("all").unwrap().indices(), &[1, 2, 3]);
    assert_eq!(recipe.tag("first").unwrap().indices(), &[1]);
    assert_eq!(recipe.tag("last_two").unwrap().indices(), &[2, 3]);

    let all = recipe.tag("all").unwrap();
    let first = recipe.tag("first").unwrap();
    let last_two = recipe.tag("last_two").unwrap();
    assert_eq!(&(first | last_two), all);
    assert_eq!(&!first, last_two);
    assert!((first & last_two).is_empty());
}

#[test]
fn test_simple_annotations() {
    let storage = MemoryStorage::new();
    let recipe = RecipeComposer::new(&storage).compose(&basic()).unwrap();

    let comments: Vec<_> = recipe
        .iter()
        .map(|item| item.annotation("comment").cloned())
        .collect();
    assert_eq!(
        comments,
        vec![
            Some(json!("first comment")),
            Some(json!("second comment")),
            Some(json!("third comment")),
        ]
    );
}

#[test]
fn test_special_markers() {
    let storage = MemoryStorage::new();
    let spec = spec(json!({
        "metadata": {"type": "static", "id": "markers"},
        "content": [
            "l1",
            {"tag": "preceding", "with": "special-first"},
            {"tag": "subsequent", "with": "special-next"},
            "l2",
            "l3"
        ]
    }));
    let recipe = RecipeComposer::new(&storage).compose(&spec).unwrap();

    assert_eq!(lines(&recipe), vec!["l1", "l2", "l3"]);
    assert_eq!(recipe.tag("special-first").unwrap().indices(), &[1]);
    assert_eq!(recipe.tag("special-next").unwrap().indices(), &[1, 2, 3]);
}

// ============================================================================
// Inclusion
// ============================================================================

#[test]
fn test_dependency_inclusion() {
    let mut storage = MemoryStorage::new();
    storage.insert("dep", dependency());

    let root = basic().with_entry(ContentEntry::include("dep"));
    let recipe = RecipeComposer::new(&storage).compose(&root).unwrap();

    assert_eq!(recipe.len(), 6);
    assert_eq!(recipe.tag("all").unwrap().indices(), &[1, 2, 3, 4, 5, 6]);
    assert_eq!(recipe.tag("first").unwrap().indices(), &[1, 4]);
    assert_eq!(recipe.tag("last_two").unwrap().indices(), &[2, 3, 5, 6]);

    for position in 1..=3 {
        assert!(!recipe.get(position).unwrap().has_annotation("extra-comment"));
    }
    assert_eq!(
        recipe.get(4).unwrap().annotation("extra-comment"),
        Some(&json!("extra first"))
    );
    assert_eq!(
        recipe.get(6).unwrap().annotation("extra-comment"),
        Some(&json!("extra third"))
    );
    assert_eq!(
        recipe.get(5).unwrap().annotation("comment"),
        Some(&json!("second comment"))
    );
}

#[test]
fn test_inclusion_offset() {
    let mut storage = MemoryStorage::new();
    storage.insert(
        "inner",
        spec(json!({
            "metadata": {"type": "static", "id": "inner"},
            "content": ["x", "y", "z"],
            "tags": {"odd": "../2", "last": -1}
        })),
    );

    let root = spec(json!({
        "metadata": {"type": "static", "id": "outer"},
        "content": ["a", "b", {"include": "inner"}, "c", {"include": "inner"}]
    }));
    let recipe = RecipeComposer::new(&storage).compose(&root).unwrap();

    assert_eq!(lines(&recipe), vec!["a", "b", "x", "y", "z", "c", "x", "y", "z"]);
    // First copy shifted by 2, second by 6.
    assert_eq!(recipe.tag("odd").unwrap().indices(), &[3, 5, 7, 9]);
    assert_eq!(recipe.tag("last").unwrap().indices(), &[5, 9]);
    assert_eq!(recipe.tag("odd").unwrap().total_len(), 9);
}

#[test]
fn test_nested_inclusion_and_stats() {
    let mut storage = MemoryStorage::new();
    storage.insert(
        "leaf",
        spec(json!({
            "metadata": {"type": "static", "id": "leaf"},
            "content": ["leaf"],
            "tags": {"leaves": "1"}
        })),
    );
    storage.insert(
        "middle",
        spec(json!({
            "metadata": {"type": "static", "id": "middle"},
            "content": ["middle", {"include": "leaf"}]
        })),
    );

    let root = spec(json!({
        "metadata": {"type": "static", "id": "root"},
        "content": [{"include": "middle"}, {"include": "leaf"}]
    }));
    let recipe = RecipeComposer::new(&storage).compose(&root).unwrap();

    assert_eq!(lines(&recipe), vec!["middle", "leaf", "leaf"]);
    assert_eq!(recipe.tag("leaves").unwrap().indices(), &[2, 3]);

    let stats = recipe.stats();
    assert_eq!(stats.recipes_composed, 4);
    assert_eq!(stats.max_depth, 3);
}

#[test]
fn test_diamond_inclusion_is_not_a_cycle() {
    let mut storage = MemoryStorage::new();
    storage.insert(
        "shared",
        spec(json!({"metadata": {"type": "static", "id": "shared"}, "content": ["s"]})),
    );
    storage.insert(
        "left",
        spec(json!({"metadata": {"type": "static", "id": "left"}, "content": [{"include": "shared"}]})),
    );
    storage.insert(
        "right",
        spec(json!({"metadata": {"type": "static", "id": "right"}, "content": [{"include": "shared"}]})),
    );

    let root = spec(json!({
        "metadata": {"type": "static", "id": "top"},
        "content": [{"include": "left"}, {"include": "right"}]
    }));
    let recipe = RecipeComposer::new(&storage).compose(&root).unwrap();
    assert_eq!(lines(&recipe), vec!["s", "s"]);
}

#[test]
fn test_tags_are_unions_of_contributions() {
    let mut storage = MemoryStorage::new();
    storage.insert(
        "dep",
        spec(json!({
            "metadata": {"type": "static", "id": "dep"},
            "content": ["d1", "d2"],
            "tags": {"shared": "1..2"}
        })),
    );

    let root = spec(json!({
        "metadata": {"type": "static", "id": "root"},
        "content": ["r1", {"include": "dep"}],
        "tags": {"shared": [1, 2]}
    }));
    let recipe = RecipeComposer::new(&storage).compose(&root).unwrap();
    assert_eq!(recipe.raw_tag("shared"), Some(&[1, 2, 3][..]));
}

// ============================================================================
// Cycles and limits
// ============================================================================

#[test]
fn test_direct_cycle() {
    let mut storage = MemoryStorage::new();
    storage.insert("basic", basic().with_entry(ContentEntry::include("basic")));

    let composer = RecipeComposer::new(&storage);
    match composer.compose_by_name("basic") {
        Err(RecipeError::CyclicDependency { id, chain }) => {
            assert_eq!(id, "sta");
            assert_eq!(chain, vec!["sta", "sta"]);
        }
        other => panic!("Expected CyclicDependency, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_transitive_cycle() {
    let mut storage = MemoryStorage::new();
    for (name, next) in [("a", "b"), ("b", "c"), ("c", "a")] {
        storage.insert(
            name,
            spec(json!({
                "metadata": {"type": "static", "id": name},
                "content": [name, {"include": next}]
            })),
        );
    }

    let err = RecipeComposer::new(&storage)
        .compose_by_name("a")
        .unwrap_err();
    match &err {
        RecipeError::CyclicDependency { id, chain } => {
            assert_eq!(id, "a");
            assert_eq!(chain, &vec!["a", "b", "c", "a"]);
        }
        other => panic!("Expected CyclicDependency, got {:?}", other),
    }
    assert!(err.to_string().contains("a -> b -> c -> a"));
}

#[test]
fn test_depth_limit() {
    let mut storage = MemoryStorage::new();
    storage.insert(
        "one",
        spec(json!({"metadata": {"type": "static", "id": "one"}, "content": [{"include": "two"}]})),
    );
    storage.insert(
        "two",
        spec(json!({"metadata": {"type": "static", "id": "two"}, "content": ["deep"]})),
    );

    let root = spec(json!({
        "metadata": {"type": "static", "id": "root"},
        "content": [{"include": "one"}]
    }));

    let shallow = ComposeConfig::builder().with_max_depth(2).build();
    assert!(matches!(
        RecipeComposer::with_config(&storage, shallow).compose(&root),
        Err(RecipeError::DepthExceeded { ref id, limit: 2 }) if id == "two"
    ));

    let deep_enough = ComposeConfig::builder().with_max_depth(3).build();
    let recipe = RecipeComposer::with_config(&storage, deep_enough)
        .compose(&root)
        .unwrap();
    assert_eq!(lines(&recipe), vec!["deep"]);
}

/// An acyclic chain `n0 -> n1 -> ... -> n{levels - 1}`, one item per level.
fn chain(levels: usize) -> MemoryStorage {
    (0..levels)
        .map(|i| {
            let id = format!("n{}", i);
            let content = if i + 1 < levels {
                json!(["x", {"include": format!("n{}", i + 1)}])
            } else {
                json!(["x"])
            };
            let spec = spec(json!({"metadata": {"type": "static", "id": id}, "content": content}));
            (id, spec)
        })
        .collect()
}

#[test]
fn test_deep_acyclic_chain_hits_default_depth_limit() {
    let storage = chain(DEFAULT_MAX_DEPTH * 10);

    match RecipeComposer::new(&storage).compose_by_name("n0") {
        Err(RecipeError::DepthExceeded { id, limit }) => {
            assert_eq!(limit, DEFAULT_MAX_DEPTH);
            assert_eq!(id, format!("n{}", DEFAULT_MAX_DEPTH));
        }
        other => panic!("Expected DepthExceeded, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_chain_at_default_depth_limit_composes() {
    let storage = chain(DEFAULT_MAX_DEPTH);
    let recipe = RecipeComposer::new(&storage).compose_by_name("n0").unwrap();

    assert_eq!(recipe.len(), DEFAULT_MAX_DEPTH);
    assert_eq!(recipe.stats().max_depth, DEFAULT_MAX_DEPTH);
}

#[test]
fn test_depth_limit_can_be_lifted() {
    let storage = chain(DEFAULT_MAX_DEPTH + 36);
    let config = ComposeConfig::builder().without_max_depth().build();

    let recipe = RecipeComposer::with_config(&storage, config)
        .compose_by_name("n0")
        .unwrap();
    assert_eq!(recipe.len(), DEFAULT_MAX_DEPTH + 36);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_include() {
    let storage = MemoryStorage::new();
    let root = basic().with_entry(ContentEntry::include("nowhere"));
    assert!(matches!(
        RecipeComposer::new(&storage).compose(&root),
        Err(RecipeError::NotFound(name)) if name == "nowhere"
    ));
}

#[test]
fn test_error_inside_inclusion_propagates() {
    let mut storage = MemoryStorage::new();
    storage.insert("dep", dependency().with_tag("broken", TagValue::from("1..9")));

    let root = basic().with_entry(ContentEntry::include("dep"));
    assert!(matches!(
        RecipeComposer::new(&storage).compose(&root),
        Err(RecipeError::Parse(_))
    ));
}

#[test]
fn test_tag_resolved_against_final_length() {
    let mut storage = MemoryStorage::new();
    storage.insert("dep", dependency());

    // Position 6 only exists once the inclusion has been spliced in.
    let root = basic()
        .with_entry(ContentEntry::include("dep"))
        .with_tag("tail", TagValue::from("5..6"));
    let recipe = RecipeComposer::new(&storage).compose(&root).unwrap();
    assert_eq!(recipe.tag("tail").unwrap().indices(), &[5, 6]);
}

// ============================================================================
// Querying
// ============================================================================

#[test]
fn test_select_with_set_algebra() {
    let mut storage = MemoryStorage::new();
    storage.insert("dep", dependency());
    let root = basic().with_entry(ContentEntry::include("dep"));
    let recipe = RecipeComposer::new(&storage).compose(&root).unwrap();

    let wanted = recipe.tag("all").unwrap() - recipe.tag("first").unwrap();
    let selected: Vec<_> = recipe
        .select(&wanted)
        .unwrap()
        .iter()
        .map(|item| item.to_string())
        .collect();
    assert_eq!(selected, vec!["line2", "line3", "line2", "line3"]);

    let foreign = IndexCollection::new(vec![7], 7);
    assert!(recipe.select(&foreign).is_err());
}

// ============================================================================
// Storage collaborators
// ============================================================================

const INTRO_YAML: &str = "\
metadata:
  id: intro
  type: static
  name: Introduction
content:
  - Welcome
  - include: greeting
  - tag: subsequent
    with: body
  - Goodbye
tags:
  all: '1..-1'
  ends: [1, -1]
annotations:
  speaker: [host, {jump: 4}, host]
";

const GREETING_YAML: &str = "\
metadata:
  id: greeting
  type: static
content:
  - Hello
  - Hi
tags:
  greetings: '1..2'
";

#[test]
fn test_compose_from_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("intro.yaml"), INTRO_YAML).unwrap();
    fs::write(dir.path().join("greeting.yaml"), GREETING_YAML).unwrap();

    let storage = FileStorage::new(StorageConfig::new([dir.path()]));
    let recipe = RecipeComposer::new(&storage)
        .compose_by_name("intro")
        .unwrap();

    assert_eq!(recipe.metadata().name, "Introduction");
    assert_eq!(lines(&recipe), vec!["Welcome", "Hello", "Hi", "Goodbye"]);
    assert_eq!(recipe.tag("all").unwrap().indices(), &[1, 2, 3, 4]);
    assert_eq!(recipe.tag("ends").unwrap().indices(), &[1, 4]);
    assert_eq!(recipe.tag("greetings").unwrap().indices(), &[2, 3]);
    assert_eq!(recipe.tag("body").unwrap().indices(), &[3, 4]);

    assert_eq!(recipe.get(1).unwrap().annotation("speaker"), Some(&json!("host")));
    assert!(!recipe.get(2).unwrap().has_annotation("speaker"));
    assert_eq!(recipe.get(4).unwrap().annotation("speaker"), Some(&json!("host")));
}

#[test]
fn test_cached_storage_serves_repeated_includes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("greeting.yaml"), GREETING_YAML).unwrap();
    fs::write(
        dir.path().join("twice.yaml"),
        "metadata: {id: twice, type: static}\ncontent:\n  - include: greeting\n  - include: greeting\n",
    )
    .unwrap();

    let storage = CachedStorage::new(
        FileStorage::new(StorageConfig::new([dir.path()])),
        CacheConfig::default(),
    );
    let composer = RecipeComposer::new(&storage);

    let recipe = composer.compose_by_name("twice").unwrap();
    assert_eq!(lines(&recipe), vec!["Hello", "Hi", "Hello", "Hi"]);
    assert_eq!(recipe.tag("greetings").unwrap().indices(), &[1, 2, 3, 4]);

    let stats = storage.stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 1);

    composer.compose_by_name("twice").unwrap();
    assert_eq!(storage.stats().hits, 4);
}

#[test]
fn test_written_spec_composes_identically() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::new(StorageConfig::new([dir.path()]));

    let mut memory = MemoryStorage::new();
    memory.insert("dep", dependency());
    let root = basic().with_entry(ContentEntry::include("dep"));

    storage.write("dep", &dependency()).unwrap();
    storage.write("root", &root).unwrap();
    assert_eq!(storage.load_recipe("root").unwrap(), root);

    let from_memory = RecipeComposer::new(&memory).compose(&root).unwrap();
    let from_files = RecipeComposer::new(&storage).compose_by_name("root").unwrap();
    assert_eq!(lines(&from_memory), lines(&from_files));
    assert_eq!(from_memory.raw_tags(), from_files.raw_tags());
}
