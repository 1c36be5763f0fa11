// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-job attempt loop (spec §4.5.2): the core retry-until-clean
//! state machine, one iteration per `Setup`/`Run`/post-mortem cycle.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Map;
use tokio::sync::mpsc;

use custodian_core::{
    CustodianError, Handler, HandlerId, Job, JobId, Mutation, RunLogEntry, SupervisorConfig,
    TerminationReason,
};
use custodian_mutate::Modder;
use custodian_snapshot::CacheRegistry;

use super::monitor::run_monitor;

const ERROR_BACKUP_PREFIX: &str = "error";

/// Everything one attempt needs that lives longer than the attempt itself.
pub struct AttemptContext<'a> {
    pub job: &'a dyn Job,
    pub job_id: &'a JobId,
    pub handlers: &'a [Arc<dyn Handler>],
    pub config: &'a SupervisorConfig,
    pub modder: &'a Modder,
    pub dicts: &'a mut HashMap<String, Map<String, serde_json::Value>>,
    pub cache_registry: &'a CacheRegistry,
    pub n_applied_corrections: &'a mut HashMap<HandlerId, u32>,
    pub total_errors: &'a mut u32,
    pub max_errors_per_job: Option<u32>,
    pub dir: &'a Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// No handler fired; `job.postprocess` has already run.
    Success,
}

/// Whether one pass through the post-mortem/correction phase (steps 6-12)
/// left the job done, or needs another full `Setup`/`Run` attempt.
enum StepResult {
    Success,
    Retry,
}

/// Drives one job through as many attempts as it takes to either succeed
/// cleanly or hit a quota/non-recoverable error (spec §4.5.2). `entry` is
/// mutated in place so a caller can persist the partial run log even if
/// this returns an error.
pub async fn run_attempt(
    ctx: &mut AttemptContext<'_>,
    entry: &mut RunLogEntry,
) -> Result<AttemptOutcome, CustodianError> {
    loop {
        tracing::info!(
            job = %ctx.job_id,
            total_errors = *ctx.total_errors,
            "starting attempt"
        );

        ctx.job.setup(ctx.dir).await?;
        let mut process = ctx.job.run(ctx.dir).await?;

        let monitor_handlers: Vec<Arc<dyn Handler>> = ctx
            .handlers
            .iter()
            .filter(|h| h.config().is_monitor)
            .cloned()
            .collect();

        let exit_code = if monitor_handlers.is_empty() {
            process.wait().await?
        } else {
            let (hit_tx, mut hit_rx) = mpsc::channel(1);
            let monitor_task = tokio::spawn(run_monitor(
                monitor_handlers,
                ctx.dir.to_path_buf(),
                ctx.config.polling_time_step,
                ctx.config.monitor_freq,
                hit_tx,
            ));

            tokio::select! {
                exit = process.wait() => {
                    monitor_task.abort();
                    exit?
                }
                Some(_hit) = hit_rx.recv() => {
                    ctx.job.terminate(ctx.dir).await?;
                    let exit = process.wait().await?;
                    monitor_task.abort();
                    exit
                }
            }
        };

        match after_exit(ctx, entry, exit_code).await? {
            StepResult::Success => return Ok(AttemptOutcome::Success),
            StepResult::Retry => continue,
        }
    }
}

/// Resumes a run after an external interruption (spec §4.5.6): the
/// currently-pending job's `Setup`/`Run`/`Postprocess` are skipped and its
/// last-known attempt is treated as having just exited cleanly, jumping
/// straight into the post-mortem phase. If that attempt itself triggers a
/// further retry, that retry goes through the ordinary full attempt cycle.
pub async fn run_interrupted_attempt(
    ctx: &mut AttemptContext<'_>,
    entry: &mut RunLogEntry,
) -> Result<AttemptOutcome, CustodianError> {
    match after_exit(ctx, entry, 0).await? {
        StepResult::Success => Ok(AttemptOutcome::Success),
        StepResult::Retry => run_attempt(ctx, entry).await,
    }
}

/// Steps 6-12 of the attempt loop (spec §4.5.2): flush the memoization
/// cache, check the return code, run the post-mortem handler phase, and
/// dispatch corrections.
async fn after_exit(
    ctx: &mut AttemptContext<'_>,
    entry: &mut RunLogEntry,
    exit_code: i32,
) -> Result<StepResult, CustodianError> {
    ctx.cache_registry.clear_all();

    if exit_code != 0 {
        entry.termination = Some(TerminationReason::NonzeroReturnCode);
        if ctx.config.terminate_on_nonzero_returncode && ctx.job.terminate_on_errors() {
            return Err(CustodianError::ReturnCodeError {
                job: ctx.job_id.clone(),
                code: exit_code,
            });
        }
    } else {
        entry.termination = None;
    }

    let mut triggered = Vec::new();
    for (index, handler) in ctx.handlers.iter().enumerate() {
        let config = handler.config();
        if exit_code != 0 && config.skip_over_nonzero_return_code {
            continue;
        }
        match handler.check(ctx.dir).await {
            Ok(true) => {
                triggered.push(index);
                if config.is_terminating {
                    break;
                }
            }
            Ok(false) => {}
            Err(error) => {
                if ctx.config.skip_over_errors {
                    tracing::warn!(handler = %handler.id(), %error, "handler check failed, skipping");
                    continue;
                }
                return Err(CustodianError::Io(error));
            }
        }
    }

    if triggered.is_empty() {
        ctx.job.postprocess(ctx.dir).await?;
        return Ok(StepResult::Success);
    }

    for index in triggered {
        let handler = &ctx.handlers[index];
        let config = handler.config();
        let applied = ctx
            .n_applied_corrections
            .entry(handler.id().clone())
            .or_insert(0);

        let effective_max = config.max_num_corrections.or(ctx.config.max_errors_per_handler);
        if let Some(max) = effective_max {
            if *applied >= max {
                if config.raise_on_max {
                    entry.termination = Some(TerminationReason::MaxErrorsPerHandler);
                    entry.handler = Some(handler.id().clone());
                    return Err(CustodianError::MaxCorrectionsPerHandlerError {
                        job: ctx.job_id.clone(),
                        handler: handler.id().clone(),
                        max_errors_per_handler: max,
                    });
                }
                tracing::info!(handler = %handler.id(), "handler at its correction cap, skipping");
                continue;
            }
        }

        custodian_snapshot::take_backup(&[String::from("*")], ERROR_BACKUP_PREFIX, ctx.dir)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        let record = handler.correct(ctx.dir).await?;
        let uncorrectable = !record.is_correctable();
        if let Some(actions) = &record.actions {
            for mutation in actions {
                apply_mutation(ctx.modder, ctx.dir, mutation, ctx.dicts)?;
            }
        }
        entry.corrections.push(record);

        if uncorrectable && config.raises_runtime_error {
            return Err(CustodianError::NonRecoverableError {
                job: ctx.job_id.clone(),
                handler: handler.id().clone(),
                message: entry
                    .corrections
                    .last()
                    .map(|r| r.errors.join("; "))
                    .unwrap_or_default(),
            });
        }

        *ctx.n_applied_corrections.entry(handler.id().clone()).or_insert(0) += 1;
        *ctx.total_errors += 1;
    }

    if *ctx.total_errors >= ctx.config.max_errors {
        entry.termination = Some(TerminationReason::MaxErrors);
        return Err(CustodianError::MaxCorrectionsError {
            job: ctx.job_id.clone(),
            max_errors: ctx.config.max_errors,
        });
    }
    if let Some(max_per_job) = ctx.max_errors_per_job {
        if entry.corrections.len() as u32 >= max_per_job {
            entry.termination = Some(TerminationReason::MaxErrorsPerJob);
            return Err(CustodianError::MaxCorrectionsPerJobError {
                job: ctx.job_id.clone(),
                max_errors_per_job: max_per_job,
            });
        }
    }

    Ok(StepResult::Retry)
}

fn apply_mutation(
    modder: &Modder,
    dir: &Path,
    mutation: &Mutation,
    dicts: &mut HashMap<String, Map<String, serde_json::Value>>,
) -> Result<(), CustodianError> {
    modder
        .apply(dir, mutation, dicts)
        .map_err(|e| CustodianError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

#[cfg(test)]
#[path = "attempt_tests.rs"]
mod tests;
