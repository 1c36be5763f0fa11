// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor-wide configuration (spec §3 "SupervisorConfig", §4.5).

use std::path::PathBuf;
use std::time::Duration;

/// Quotas and policy knobs for one `Supervisor::run` (spec §3, §4.2, §4.5).
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Total corrections allowed across the whole run before it aborts.
    pub max_errors: u32,
    /// Corrections allowed for a single job before it aborts.
    pub max_errors_per_job: Option<u32>,
    /// Default corrections-per-handler cap for handlers that don't set
    /// their own `HandlerConfig::max_num_corrections`. Whether hitting it
    /// aborts the run or just stops that handler from firing again is
    /// still up to the handler's own `raise_on_max`.
    pub max_errors_per_handler: Option<u32>,
    /// How often the attempt loop polls a running child for monitor
    /// handlers and liveness.
    pub polling_time_step: Duration,
    /// Default monitor tick divisor for handlers that don't set their own
    /// `monitor_freq`.
    pub monitor_freq: u32,
    /// If true, a handler erroring out of `check`/`correct` is logged and
    /// skipped rather than aborting the run.
    pub skip_over_errors: bool,
    /// If true, a non-zero child exit code aborts the run outright instead
    /// of going through the handler pipeline.
    pub terminate_on_nonzero_returncode: bool,
    /// Gzip job directories after a successful run (spec §4.7 "Snapshot").
    pub gzipped_output: bool,
    /// Write a `custodian.json` checkpoint after every attempt, enabling
    /// `Supervisor::run_interrupted` to resume.
    pub checkpoint: bool,
    /// If set, attempts run inside a scratch copy of the job directory and
    /// results are copied back on completion (spec §4.8 "ScratchDir").
    pub scratch_dir: Option<PathBuf>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_errors: 1,
            max_errors_per_job: None,
            max_errors_per_handler: None,
            polling_time_step: Duration::from_secs(10),
            monitor_freq: 30,
            skip_over_errors: false,
            terminate_on_nonzero_returncode: true,
            gzipped_output: false,
            checkpoint: false,
            scratch_dir: None,
        }
    }
}