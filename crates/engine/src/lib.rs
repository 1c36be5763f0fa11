// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! The Custodian supervisor: drives a sequence of `Job`s through the
//! attempt loop (`runtime`), pulling jobs one at a time from a
//! [`JobSource`], and can bootstrap itself from a declarative spec
//! (`specfile`, §4.6). Orchestration lives here; the vocabulary it
//! orchestrates (`Job`, `Handler`, `Validator`, errors) lives in
//! `custodian-core`.

pub mod job_source;
pub mod runtime;
pub mod specfile;
pub mod supervisor;

pub use job_source::{JobSource, VecJobSource};
pub use runtime::{
    enter_scratch, run_attempt, run_interrupted_attempt, run_monitor, AttemptContext,
    AttemptOutcome, MonitorHit, ScratchGuard,
};
pub use specfile::{LoadedEntry, LoadedSpec, SpecError, SupervisorSpec};
pub use supervisor::Supervisor;
