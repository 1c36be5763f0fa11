// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Modder`: applies a [`Mutation`] by dispatching each keyword in its
//! ops-map through an explicit registry built at construction time.
//!
//! Reflecting over an action class's methods at runtime to discover
//! operations isn't idiomatic here; the registry is instead an explicit
//! `HashMap` built from a fixed list of keywords per [`ActionClass`].

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use custodian_core::{Mutation, OpMap};

use crate::dict::{self, DictOp};
use crate::error::MutateError;
use crate::file::{self, FileOp};

/// Which namespace of operations a [`Modder`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    Dict,
    File,
}

/// Applies mutations by keyword lookup against an explicit op registry.
pub struct Modder {
    dict_ops: HashMap<&'static str, DictOp>,
    file_ops: HashMap<&'static str, FileOp>,
    strict: bool,
}

fn dict_registry() -> HashMap<&'static str, DictOp> {
    let mut ops: HashMap<&'static str, DictOp> = HashMap::new();
    ops.insert("_set", dict::set);
    ops.insert("_unset", dict::unset);
    ops.insert("_push", dict::push);
    ops.insert("_push_all", dict::push_all);
    ops.insert("_inc", dict::inc);
    ops.insert("_rename", dict::rename);
    ops.insert("_add_to_set", dict::add_to_set);
    ops.insert("_pull", dict::pull);
    ops.insert("_pull_all", dict::pull_all);
    ops.insert("_pop", dict::pop);
    ops
}

fn file_registry() -> HashMap<&'static str, FileOp> {
    let mut ops: HashMap<&'static str, FileOp> = HashMap::new();
    ops.insert("_file_create", file::file_create as FileOp);
    ops.insert("_file_move", file::file_move as FileOp);
    ops.insert("_file_delete", file::file_delete as FileOp);
    ops.insert("_file_copy", file::file_copy as FileOp);
    ops.insert("_file_modify", file::file_modify as FileOp);
    ops
}

impl Modder {
    /// Builds the op registry restricted to `classes`; `strict` controls
    /// what happens when a keyword is not found in that registry.
    pub fn new(classes: &[ActionClass], strict: bool) -> Self {
        let mut dict_ops = HashMap::new();
        let mut file_ops = HashMap::new();
        for class in classes {
            match class {
                ActionClass::Dict => dict_ops = dict_registry(),
                ActionClass::File => file_ops = file_registry(),
            }
        }
        Self {
            dict_ops,
            file_ops,
            strict,
        }
    }

    /// Both namespaces enabled, strict keyword checking.
    pub fn standard() -> Self {
        Self::new(&[ActionClass::Dict, ActionClass::File], true)
    }

    pub fn apply_dict(&self, dict: &mut Map<String, Value>, action: &OpMap) -> Result<(), MutateError> {
        for (keyword, operand) in action {
            let Some(op) = self.dict_ops.get(keyword.as_str()) else {
                if self.strict {
                    return Err(MutateError::UnsupportedAction(keyword.clone()));
                }
                tracing::warn!(op = %keyword, "skipping unsupported dict action (non-strict)");
                continue;
            };
            let operand = operand
                .as_object()
                .ok_or_else(|| MutateError::MissingKey(keyword.clone()))?;
            op(dict, operand)?;
        }
        Ok(())
    }

    pub fn apply_file(
        &self,
        dir: &Path,
        filename: &str,
        action: &OpMap,
    ) -> Result<(), MutateError> {
        for (keyword, operand) in action {
            let Some(op) = self.file_ops.get(keyword.as_str()) else {
                if self.strict {
                    return Err(MutateError::UnsupportedAction(keyword.clone()));
                }
                tracing::warn!(op = %keyword, "skipping unsupported file action (non-strict)");
                continue;
            };
            let operand = operand
                .as_object()
                .ok_or_else(|| MutateError::MissingKey(keyword.clone()))?;
            op(dir, filename, operand)?;
        }
        Ok(())
    }

    /// Applies one [`Mutation`]. `dicts` resolves a `Mutation::Dict`'s
    /// logical name to the in-memory mapping it addresses; the caller owns
    /// that mapping (the core treats it as opaque, spec §3).
    pub fn apply(
        &self,
        dir: &Path,
        mutation: &Mutation,
        dicts: &mut HashMap<String, Map<String, Value>>,
    ) -> Result<(), MutateError> {
        match mutation {
            Mutation::Dict { dict, action } => {
                let target = dicts.entry(dict.clone()).or_default();
                self.apply_dict(target, action)
            }
            Mutation::File { file, action } => self.apply_file(dir, file, action),
        }
    }
}

#[cfg(test)]
#[path = "modder_tests.rs"]
mod tests;
