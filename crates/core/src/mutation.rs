// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutation sub-language (spec §3 "Mutation", §4.3) and the record a
//! handler hands back after `correct()`.
//!
//! A `Mutation` targets either a structured document (by dotted/arrow key
//! path) or a whole file, and the actual verbs (`set`, `push`, `inc`, ...)
//! are interpreted by `custodian-mutate`. This crate only owns the shape of
//! the data that crosses the `Handler` boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::id::HandlerId;

/// One verb applied to one addressed location: e.g. `set` with operand
/// `Value::Number(4)`. Ordering of multiple ops against the same target
/// within one `Mutation` is preserved via `BTreeMap`'s key order only when
/// keys are distinct; callers needing strict op ordering should emit one
/// `Mutation` per op.
pub type OpMap = BTreeMap<String, Value>;

/// A single correction directive, as recorded in a `CorrectionRecord` and
/// replayed by `custodian-mutate` (spec §3 "Mutation", §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Mutation {
    /// Mutate keys inside a structured document identified by `dict`
    /// (an arrow-separated path addressing a loaded config/state blob).
    Dict { dict: String, action: OpMap },
    /// Mutate a file on disk directly (create/move/delete/copy/modify).
    File { file: String, action: OpMap },
}

/// What a handler reports after `correct()` (spec §3 "CorrectionRecord").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// Human-readable description(s) of what was wrong.
    pub errors: Vec<String>,
    /// The fix applied. `None` means the handler detected an error it could
    /// not correct (spec §4.4: consulted against `raises_runtime_error`).
    pub actions: Option<Vec<Mutation>>,
    /// Which handler produced this record.
    pub handler: HandlerId,
    /// Handler-specific extra context, passed through verbatim into
    /// `RunLogEntry` JSON.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, Value>,
}

impl CorrectionRecord {
    pub fn uncorrectable(handler: HandlerId, errors: Vec<String>) -> Self {
        Self {
            errors,
            actions: None,
            handler,
            extra: serde_json::Map::new(),
        }
    }

    pub fn corrected(handler: HandlerId, errors: Vec<String>, actions: Vec<Mutation>) -> Self {
        Self {
            errors,
            actions: Some(actions),
            handler,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_correctable(&self) -> bool {
        self.actions.is_some()
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;