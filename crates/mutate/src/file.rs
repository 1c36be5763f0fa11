// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File operations (spec §4.1): in-place edits to files under a job's
//! working directory.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::MutateError;

/// Signature shared by every file op: operates on `dir.join(filename)`.
pub type FileOp = fn(&Path, &str, &Map<String, Value>) -> Result<(), MutateError>;

pub fn file_create(dir: &Path, filename: &str, operand: &Map<String, Value>) -> Result<(), MutateError> {
    let content = operand
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| MutateError::MissingKey("content".into()))?;
    std::fs::write(dir.join(filename), content)?;
    Ok(())
}

pub fn file_move(dir: &Path, filename: &str, operand: &Map<String, Value>) -> Result<(), MutateError> {
    let dest = operand
        .get("dest")
        .and_then(Value::as_str)
        .ok_or_else(|| MutateError::MissingKey("dest".into()))?;
    std::fs::rename(dir.join(filename), dir.join(dest))?;
    Ok(())
}

pub fn file_delete(dir: &Path, filename: &str, operand: &Map<String, Value>) -> Result<(), MutateError> {
    let mode = operand.get("mode").and_then(Value::as_str).unwrap_or("actual");
    let path = dir.join(filename);
    if mode == "simulated" {
        tracing::info!(file = %path.display(), "simulated delete, leaving file in place");
        return Ok(());
    }
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Copies `filename` to every value whose key starts with `dest`
/// (`dest`, `dest1`, `dest_backup`, ...), per spec §4.1.
pub fn file_copy(dir: &Path, filename: &str, operand: &Map<String, Value>) -> Result<(), MutateError> {
    let src = dir.join(filename);
    for (key, value) in operand {
        if !key.starts_with("dest") {
            continue;
        }
        let Some(dest) = value.as_str() else {
            continue;
        };
        std::fs::copy(&src, dir.join(dest))?;
    }
    Ok(())
}

pub fn file_modify(dir: &Path, filename: &str, operand: &Map<String, Value>) -> Result<(), MutateError> {
    let path = dir.join(filename);

    if let Some(mode) = operand.get("mode").and_then(Value::as_str) {
        set_mode(&path, mode)?;
    }
    if operand.contains_key("owners") {
        tracing::warn!(
            file = %path.display(),
            "file_modify owners is not supported on this platform, ignoring"
        );
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: &str) -> Result<(), MutateError> {
    use std::os::unix::fs::PermissionsExt;
    let bits = u32::from_str_radix(mode, 8).unwrap_or(0o644);
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(bits))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: &str) -> Result<(), MutateError> {
    tracing::warn!(file = %path.display(), "file_modify mode is unix-only, ignoring");
    Ok(())
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
