// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn top_level_key_resolves_to_root() {
    let mut root = Map::new();
    let (parent, leaf) = resolve_nested_mut(&mut root, "Hello");
    parent.insert(leaf, json!("Universe"));
    assert_eq!(root["Hello"], json!("Universe"));
}

#[test]
fn nested_path_creates_intermediate_maps() {
    let mut root = Map::new();
    let (parent, leaf) = resolve_nested_mut(&mut root, "a->b->c");
    parent.insert(leaf, json!(100));
    assert_eq!(root, json!({"a": {"b": {"c": 100}}}));
}

#[test]
fn nested_path_reuses_existing_intermediate_maps() {
    let mut root: Map<String, Value> = serde_json::from_value(json!({"a": {"b": {"c": 100}}}))
        .unwrap_or_default();
    let (parent, leaf) = resolve_nested_mut(&mut root, "a->b->c");
    let existing = parent.get(&leaf).cloned().unwrap_or(Value::Null);
    assert_eq!(existing, json!(100));
    parent.insert(leaf, json!(102));
    assert_eq!(root, json!({"a": {"b": {"c": 102}}}));
}
