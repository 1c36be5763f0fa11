// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor's error taxonomy (spec §3 "errors", §7). Each variant
//! corresponds to a distinct way a run can stop short of clean success.

use thiserror::Error;

use crate::handler::HandlerId;
use crate::job::JobId;
use crate::validator::ValidatorId;

#[derive(Debug, Error)]
pub enum CustodianError {
    /// A job's process exited non-zero and
    /// `terminate_on_nonzero_returncode` is set.
    #[error("job {job} exited with return code {code}")]
    ReturnCodeError { job: JobId, code: i32 },

    /// A handler detected an error it could not correct
    /// (`CorrectionRecord::actions == None`) and its `raises_runtime_error`
    /// is set.
    #[error("handler {handler} raised a non-recoverable error for job {job}: {message}")]
    NonRecoverableError {
        job: JobId,
        handler: HandlerId,
        message: String,
    },

    /// The run-wide correction budget (`max_errors`) was exhausted.
    #[error("job {job} exceeded the run-wide correction budget ({max_errors} corrections)")]
    MaxCorrectionsError { job: JobId, max_errors: u32 },

    /// A job's own correction budget (`max_errors_per_job`) was exhausted.
    #[error("job {job} exceeded its per-job correction budget ({max_errors_per_job} corrections)")]
    MaxCorrectionsPerJobError {
        job: JobId,
        max_errors_per_job: u32,
    },

    /// A handler's own correction budget (`max_errors_per_handler`) was
    /// exhausted and its `raise_on_max` is set.
    #[error(
        "handler {handler} exceeded its correction budget ({max_errors_per_handler} corrections) for job {job}"
    )]
    MaxCorrectionsPerHandlerError {
        job: JobId,
        handler: HandlerId,
        max_errors_per_handler: u32,
    },

    /// A validator rejected a job's output.
    #[error("validator {validator} rejected the output of job {job}")]
    ValidationError { job: JobId, validator: ValidatorId },

    /// A collaborator (`Job`/`Handler`/`Validator`) or the filesystem
    /// failed in a way none of the above domain-specific kinds name.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}