// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Job` contract (spec §3, §6): the supervisor's view of one external
//! computation. Concrete jobs are external collaborators; the core only
//! ever calls through this trait.

use async_trait::async_trait;
use std::path::Path;

pub use crate::id::JobId;

/// A running (or just-exited) child process, as returned by [`Job::run`].
///
/// `Job::run` must never block on completion — the handle is what the
/// supervisor polls and waits on (spec §3 invariant).
#[async_trait]
pub trait ProcessHandle: Send {
    /// Non-blocking check. `Some(code)` once the process has exited.
    async fn poll(&mut self) -> std::io::Result<Option<i32>>;

    /// Block until the process exits, returning its exit code.
    async fn wait(&mut self) -> std::io::Result<i32>;
}

/// One external computation, wrapped to expose the lifecycle the
/// supervisor drives (spec §3 "Job").
///
/// `Setup` must be idempotent across retries; `Run` must return
/// immediately with a handle rather than blocking on completion.
#[async_trait]
pub trait Job: Send + Sync {
    /// Stable identifier used in logs and `RunLogEntry`.
    fn name(&self) -> &str;

    /// Pre-run preparation: decompress inputs, inject overrides, copy
    /// input backups. Must be safe to call again on retry.
    async fn setup(&self, dir: &Path) -> std::io::Result<()>;

    /// Launch the external process and return a handle to it.
    async fn run(&self, dir: &Path) -> std::io::Result<Box<dyn ProcessHandle>>;

    /// Cleanup and archival after a successful attempt.
    async fn postprocess(&self, dir: &Path) -> std::io::Result<()>;

    /// Best-effort graceful shutdown, then force kill. Called by the
    /// supervisor when a monitor handler detects a failure mid-run.
    async fn terminate(&self, dir: &Path) -> std::io::Result<()>;

    /// Per-job override of which error classes terminate the run.
    /// Defaults to `true`: a non-zero return code (when configured to
    /// check it) aborts the run.
    fn terminate_on_errors(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;