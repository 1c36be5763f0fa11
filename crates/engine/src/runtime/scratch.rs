// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scratch directory lifecycle.
//!
//! Chdir-ing the whole process into a scratch copy is hostile to
//! concurrent tests, so this keeps an explicit working directory instead:
//! `ScratchGuard::dir()` is what gets threaded through `Setup`/`Run`/
//! `Postprocess` for the rest of the run, and the prior directory is
//! restored via `exit()` on every path out.

use std::path::{Path, PathBuf};

pub const SCRATCH_LINK: &str = "scratch_link";

pub struct ScratchGuard {
    scratch_dir: PathBuf,
    link: PathBuf,
    original: PathBuf,
}

impl ScratchGuard {
    pub fn dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn exit(self) -> std::io::Result<()> {
        recursive_copy(&self.scratch_dir, &self.original)?;
        std::fs::remove_dir_all(&self.scratch_dir)?;
        let _ = std::fs::remove_file(&self.link);
        Ok(())
    }
}

/// Enters a scratch copy of `original` under `root`, leaving a symlink at
/// `original/scratch_link`. Returns `None` if `root` is the same as
/// `original` (nothing to do).
pub fn enter(root: &Path, original: &Path) -> std::io::Result<Option<ScratchGuard>> {
    if root == original {
        return Ok(None);
    }

    let scratch_dir = tempfile::Builder::new().tempdir_in(root)?.into_path();
    recursive_copy(original, &scratch_dir)?;

    let link = original.join(SCRATCH_LINK);
    symlink(&scratch_dir, &link)?;

    tracing::info!(scratch = %scratch_dir.display(), "using scratch directory");
    Ok(Some(ScratchGuard {
        scratch_dir,
        link,
        original: original.to_path_buf(),
    }))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Ok(())
}

fn recursive_copy(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let dest_path = dst.join(entry.file_name());
        if file_type.is_dir() {
            recursive_copy(&entry.path(), &dest_path)?;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "scratch_tests.rs"]
mod tests;
