// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dict operations (spec §4.1): mongo-style verbs over a JSON object,
//! addressed through [`crate::path::resolve_nested_mut`] so every op
//! supports the `"a->b->c"` nested-key syntax uniformly.

use serde_json::{Map, Value};

use crate::error::MutateError;
use crate::path::resolve_nested_mut;

/// Signature shared by every dict op: `operand` is the `{target_key:
/// value}` map from the ops-map entry for this keyword.
pub type DictOp = fn(&mut Map<String, Value>, &Map<String, Value>) -> Result<(), MutateError>;

pub fn set(dict: &mut Map<String, Value>, operand: &Map<String, Value>) -> Result<(), MutateError> {
    for (key, value) in operand {
        let (parent, leaf) = resolve_nested_mut(dict, key);
        parent.insert(leaf, value.clone());
    }
    Ok(())
}

pub fn unset(
    dict: &mut Map<String, Value>,
    operand: &Map<String, Value>,
) -> Result<(), MutateError> {
    for key in operand.keys() {
        let (parent, leaf) = resolve_nested_mut(dict, key);
        parent.remove(&leaf);
    }
    Ok(())
}

pub fn push(
    dict: &mut Map<String, Value>,
    operand: &Map<String, Value>,
) -> Result<(), MutateError> {
    for (key, value) in operand {
        let (parent, leaf) = resolve_nested_mut(dict, key);
        match parent.get_mut(&leaf) {
            Some(Value::Array(arr)) => arr.push(value.clone()),
            Some(_) => return Err(MutateError::NotAnArray { key: key.clone() }),
            None => {
                parent.insert(leaf, Value::Array(vec![value.clone()]));
            }
        }
    }
    Ok(())
}

pub fn push_all(
    dict: &mut Map<String, Value>,
    operand: &Map<String, Value>,
) -> Result<(), MutateError> {
    for (key, value) in operand {
        let extra = value
            .as_array()
            .cloned()
            .ok_or_else(|| MutateError::NotAnArray { key: key.clone() })?;
        let (parent, leaf) = resolve_nested_mut(dict, key);
        match parent.get_mut(&leaf) {
            Some(Value::Array(arr)) => arr.extend(extra),
            Some(_) => return Err(MutateError::NotAnArray { key: key.clone() }),
            None => {
                parent.insert(leaf, Value::Array(extra));
            }
        }
    }
    Ok(())
}

pub fn inc(dict: &mut Map<String, Value>, operand: &Map<String, Value>) -> Result<(), MutateError> {
    for (key, value) in operand {
        let delta = value.as_f64().unwrap_or(0.0);
        let (parent, leaf) = resolve_nested_mut(dict, key);
        let current = parent.get(&leaf).and_then(Value::as_f64).unwrap_or(0.0);
        let updated = current + delta;
        let as_number = if updated.fract() == 0.0 && current.fract() == 0.0 && delta.fract() == 0.0
        {
            Value::from(updated as i64)
        } else {
            serde_json::Number::from_f64(updated)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        };
        parent.insert(leaf, as_number);
    }
    Ok(())
}

pub fn rename(
    dict: &mut Map<String, Value>,
    operand: &Map<String, Value>,
) -> Result<(), MutateError> {
    for (key, new_name) in operand {
        let (parent, leaf) = resolve_nested_mut(dict, key);
        let Some(value) = parent.remove(&leaf) else {
            continue;
        };
        let Some(new_key) = new_name.as_str() else {
            continue;
        };
        let (dest_parent, dest_leaf) = resolve_nested_mut(dict, new_key);
        dest_parent.insert(dest_leaf, value);
    }
    Ok(())
}

pub fn add_to_set(
    dict: &mut Map<String, Value>,
    operand: &Map<String, Value>,
) -> Result<(), MutateError> {
    for (key, value) in operand {
        let (parent, leaf) = resolve_nested_mut(dict, key);
        match parent.get_mut(&leaf) {
            Some(Value::Array(arr)) => {
                if !arr.contains(value) {
                    arr.push(value.clone());
                }
            }
            Some(_) => return Err(MutateError::NotAnArray { key: key.clone() }),
            None => {
                parent.insert(leaf, Value::Array(vec![value.clone()]));
            }
        }
    }
    Ok(())
}

pub fn pull(
    dict: &mut Map<String, Value>,
    operand: &Map<String, Value>,
) -> Result<(), MutateError> {
    for (key, value) in operand {
        let (parent, leaf) = resolve_nested_mut(dict, key);
        match parent.get_mut(&leaf) {
            Some(Value::Array(arr)) => arr.retain(|item| item != value),
            Some(_) => return Err(MutateError::NotAnArray { key: key.clone() }),
            None => {}
        }
    }
    Ok(())
}

pub fn pull_all(
    dict: &mut Map<String, Value>,
    operand: &Map<String, Value>,
) -> Result<(), MutateError> {
    for (key, values) in operand {
        let items = values
            .as_array()
            .ok_or_else(|| MutateError::NotAnArray { key: key.clone() })?;
        let mut one = Map::new();
        for item in items {
            one.insert(key.clone(), item.clone());
            pull(dict, &one)?;
            one.clear();
        }
    }
    Ok(())
}

pub fn pop(dict: &mut Map<String, Value>, operand: &Map<String, Value>) -> Result<(), MutateError> {
    for (key, direction) in operand {
        let (parent, leaf) = resolve_nested_mut(dict, key);
        match parent.get_mut(&leaf) {
            Some(Value::Array(arr)) if !arr.is_empty() => {
                if direction.as_i64().unwrap_or(1) < 0 {
                    arr.remove(0);
                } else {
                    arr.pop();
                }
            }
            Some(Value::Array(_)) => {}
            Some(_) => return Err(MutateError::NotAnArray { key: key.clone() }),
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "dict_tests.rs"]
mod tests;
