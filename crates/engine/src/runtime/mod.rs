// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The attempt loop and its two helper tasks (spec §4.5.2, §4.5.4, §5).

pub mod attempt;
pub mod monitor;
pub mod scratch;

pub use attempt::{run_attempt, run_interrupted_attempt, AttemptContext, AttemptOutcome};
pub use monitor::{run_monitor, MonitorHit};
pub use scratch::{enter as enter_scratch, ScratchGuard};
