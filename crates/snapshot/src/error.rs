// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
    #[error("no checkpoint tarball found under prefix {0:?}")]
    NoCheckpoint(String),
}
