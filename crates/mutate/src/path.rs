// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arrow-separated nested-key addressing (`"a->b->c"`), shared by every
//! dict op.

use serde_json::{Map, Value};

/// Walk `path` (`"a->b->c"`) inside `root`, auto-creating intermediate
/// object nodes, and return the parent map and the final path segment.
///
/// Only the *intermediate* segments are created automatically; the leaf
/// is left for the caller to read, write, or remove.
pub fn resolve_nested_mut<'a>(
    root: &'a mut Map<String, Value>,
    path: &str,
) -> (&'a mut Map<String, Value>, String) {
    let mut parts: Vec<&str> = path.split("->").collect();
    let leaf = parts.pop().unwrap_or(path).to_string();
    let mut current = root;

    for segment in parts {
        let key = segment.to_string();
        if !matches!(current.get(&key), Some(Value::Object(_))) {
            current.insert(key.clone(), Value::Object(Map::new()));
        }
        current = match current.get_mut(&key) {
            Some(Value::Object(map)) => map,
            // Can't happen: we just ensured this key holds an object.
            _ => break,
        };
    }

    (current, leaf)
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
