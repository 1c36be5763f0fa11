// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numbered gzip-tarball snapshots (spec §4.2 "Snapshot / Backup"),
//! shared by error-snapshotting and whole-directory checkpointing.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::{Path, PathBuf};

use crate::error::SnapshotError;

/// Highest `N` among `<prefix>.N.tar*` entries directly under `directory`;
/// `0` if none exist.
pub fn highest_numbered(prefix: &str, directory: &Path) -> std::io::Result<u32> {
    let mut max = 0;
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(n) = parse_number(&name.to_string_lossy(), prefix) {
            max = max.max(n);
        }
    }
    Ok(max)
}

fn parse_number(name: &str, prefix: &str) -> Option<u32> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('.')?;
    let rest = rest.strip_suffix(".tar.gz").or_else(|| rest.strip_suffix(".tar"))?;
    rest.parse().ok()
}

/// Writes `<directory>/<prefix>.<N+1>.tar.gz` containing every file
/// matched by expanding each of `filenames` as a glob (relative to
/// `directory`), archived under `<prefix>.<N+1>/<basename>` (spec §4.2).
pub fn backup(filenames: &[String], prefix: &str, directory: &Path) -> Result<PathBuf, SnapshotError> {
    let next = highest_numbered(prefix, directory)? + 1;
    let archive_name = format!("{prefix}.{next}.tar.gz");
    let archive_path = directory.join(&archive_name);
    tracing::info!(archive = %archive_path.display(), "backing up run");

    let file = std::fs::File::create(&archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let arcdir = format!("{prefix}.{next}");

    for pattern in filenames {
        let glob_pattern = directory.join(pattern);
        for entry in glob::glob(&glob_pattern.to_string_lossy())? {
            let path = entry.map_err(|e| SnapshotError::Io(e.into_error()))?;
            if !path.is_file() {
                continue;
            }
            let Some(basename) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            builder.append_path_with_name(&path, format!("{arcdir}/{basename}"))?;
        }
    }

    builder.into_inner()?.finish()?;
    Ok(archive_path)
}

/// Extracts `tarball` in place under `directory`.
pub fn extract_tarball(tarball: &Path, directory: &Path) -> Result<(), SnapshotError> {
    let file = std::fs::File::open(tarball)?;
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(directory)?;
    Ok(())
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
