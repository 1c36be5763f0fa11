// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Handler` contract (spec §3, §4.4): detects and corrects one class
//! of failure.
//!
//! Handler polymorphism is by capability set, not inheritance (spec §4.4):
//! any type implementing [`Handler`] is a valid handler. The scalar
//! attributes of spec §3 live on [`HandlerConfig`] rather than being probed
//! as ad hoc fields, and the one attribute the supervisor itself mutates
//! (`NAppliedCorrections`) is tracked by the supervisor, not the handler:
//! no duck-typed attribute probing, no handler-owned mutable state the
//! supervisor can't checkpoint.

use async_trait::async_trait;
use std::path::Path;

pub use crate::id::HandlerId;
use crate::mutation::CorrectionRecord;

/// Static configuration for a handler (spec §3 "Handler" attributes, minus
/// the supervisor-owned `NAppliedCorrections` counter).
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// May be consulted while the child process is still running.
    pub is_monitor: bool,
    /// If `is_monitor`, poll every N monitor ticks. Must be >= 1.
    pub monitor_freq: u32,
    /// If a detected error is uncorrectable (`actions == None`) and this is
    /// true, the run aborts non-recoverably; otherwise it is logged and
    /// work continues.
    pub raises_runtime_error: bool,
    /// Cap on how many times this handler may fire across the entire run.
    pub max_num_corrections: Option<u32>,
    /// When the per-handler cap is hit: abort the run (`true`) or become a
    /// silent no-op (`false`).
    pub raise_on_max: bool,
    /// The handler's check is not consulted when the child exited non-zero.
    pub skip_over_nonzero_return_code: bool,
    /// At most one terminating handler fires per attempt; once one fires,
    /// no further handlers are consulted in that attempt's post-mortem
    /// phase (spec §4.5.2 ordering policy).
    pub is_terminating: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            is_monitor: false,
            monitor_freq: 1,
            raises_runtime_error: true,
            max_num_corrections: None,
            raise_on_max: true,
            skip_over_nonzero_return_code: false,
            is_terminating: true,
        }
    }
}

/// Detector/corrector for one failure mode (spec §3, §4.4).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Identifies this handler in logs and `RunLogEntry`.
    fn id(&self) -> &HandlerId;

    fn config(&self) -> &HandlerConfig;

    /// Did this handler detect its error?
    async fn check(&self, dir: &Path) -> std::io::Result<bool>;

    /// Apply the fix. `actions: None` signals uncorrectable.
    async fn correct(&self, dir: &Path) -> std::io::Result<CorrectionRecord>;
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;