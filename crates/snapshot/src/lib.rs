// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Snapshot archiving, whole-directory checkpointing, and tracked
//! memoization (spec §4.2, §4.3, §4.5.5).

pub mod backup;
pub mod cache;
pub mod checkpoint;
pub mod error;
pub mod gzip_dir;

pub use backup::{backup as take_backup, extract_tarball, highest_numbered};
pub use cache::{CacheRegistry, Flushable, SharedCache, TrackedCache};
pub use error::SnapshotError;
pub use gzip_dir::gzip_dir;
