// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-directory checkpointing (spec §4.5.5): after each successfully
//! completed job, archive the working directory under the fixed prefix
//! `custodian.chk`, so a crashed run can resume from the last job boundary.

use std::path::{Path, PathBuf};

use crate::backup;
use crate::error::SnapshotError;

pub const CHECKPOINT_PREFIX: &str = "custodian.chk";

fn is_checkpoint_tarball(name: &str) -> bool {
    name.starts_with(CHECKPOINT_PREFIX) && name.ends_with(".tar.gz")
}

/// Archives every entry of `directory` except prior checkpoint tarballs
/// themselves (otherwise each checkpoint would embed all previous ones).
pub fn write_checkpoint(directory: &Path) -> Result<PathBuf, SnapshotError> {
    let mut filenames = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_checkpoint_tarball(&name) {
            continue;
        }
        filenames.push(name);
    }
    backup::backup(&filenames, CHECKPOINT_PREFIX, directory)
}

/// The highest checkpoint number present, if any.
pub fn highest_checkpoint(directory: &Path) -> std::io::Result<Option<u32>> {
    let n = backup::highest_numbered(CHECKPOINT_PREFIX, directory)?;
    Ok((n > 0).then_some(n))
}

/// Extracts the most recent checkpoint in place and returns its number.
/// Called at supervisor construction (spec §4.5.5).
pub fn restore_latest(directory: &Path) -> Result<Option<u32>, SnapshotError> {
    let Some(n) = highest_checkpoint(directory)? else {
        return Ok(None);
    };
    let tarball = directory.join(format!("{CHECKPOINT_PREFIX}.{n}.tar.gz"));
    backup::extract_tarball(&tarball, directory)?;
    Ok(Some(n))
}

/// Removes every checkpoint tarball. Called once `Run()` completes
/// normally (spec §8 invariant 4: no checkpoints survive a clean run).
pub fn cleanup_all(directory: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_checkpoint_tarball(&name) {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
