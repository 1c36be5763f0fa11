// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level state machine (spec §4.5.1, §4.5.5, §4.5.6): iterates
//! the job source, drives each job through the attempt loop, runs
//! validators once at the end, and handles checkpoint/scratch lifecycle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Map;

use custodian_core::{CustodianError, Handler, HandlerId, JobId, RunLogEntry, SupervisorConfig, Validator};
use custodian_mutate::Modder;
use custodian_snapshot::{checkpoint, gzip_dir, CacheRegistry};

use crate::job_source::JobSource;
use crate::runtime::attempt::{run_attempt, run_interrupted_attempt, AttemptContext};
use crate::runtime::scratch;

const RUN_LOG_FILE: &str = "custodian.json";

/// Drives a job sequence to completion or to the first unrecoverable
/// error (spec §4.5).
pub struct Supervisor {
    jobs: Box<dyn JobSource>,
    handlers: Vec<Arc<dyn Handler>>,
    validators: Vec<Arc<dyn Validator>>,
    config: SupervisorConfig,
    modder: Modder,
    dicts: HashMap<String, Map<String, serde_json::Value>>,
    cache_registry: CacheRegistry,
    n_applied_corrections: HashMap<HandlerId, u32>,
    total_errors: u32,
    run_log: Vec<RunLogEntry>,
    directory: PathBuf,
}

impl Supervisor {
    /// Restores a prior checkpoint if configured (spec §4.5.5): extracts
    /// the highest-numbered `custodian.chk.<N>.tar.gz`, reloads
    /// `custodian.json` if present, and skips the first `N` jobs from
    /// `jobs` (pulled and discarded, never materialized as a list).
    pub async fn new(
        mut jobs: Box<dyn JobSource>,
        handlers: Vec<Arc<dyn Handler>>,
        validators: Vec<Arc<dyn Validator>>,
        config: SupervisorConfig,
        directory: PathBuf,
    ) -> Result<Self, CustodianError> {
        let mut run_log = Vec::new();

        if config.checkpoint {
            if let Some(n) = checkpoint::restore_latest(&directory)
                .map_err(|e| CustodianError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
            {
                if let Some(prior) = load_run_log(&directory)? {
                    run_log = prior;
                }
                for _ in 0..n {
                    jobs.next().await?;
                }
            }
        }

        Ok(Self {
            jobs,
            handlers,
            validators,
            config,
            modder: Modder::standard(),
            dicts: HashMap::new(),
            cache_registry: CacheRegistry::new(),
            n_applied_corrections: HashMap::new(),
            total_errors: 0,
            run_log,
            directory,
        })
    }

    /// The registry a `Handler`/`Job` implementation's own `SharedCache`s
    /// should `register()` into (spec §4.3), so they get flushed along
    /// with every other tracked cache between attempts and before
    /// validators run. Call this before `run`/`run_interrupted`.
    pub fn cache_registry_mut(&mut self) -> &mut CacheRegistry {
        &mut self.cache_registry
    }

    /// Runs every remaining job to completion, then the validation phase
    /// (spec §4.5.1, §4.5.3). On error, the partial run log has already
    /// been persisted.
    pub async fn run(&mut self) -> Result<Vec<RunLogEntry>, CustodianError> {
        while let Some(job) = self.jobs.next().await? {
            let job_id = JobId::new(job.name());
            let mut entry = RunLogEntry::new(job.name());
            self.drive_job(job.as_ref(), &job_id, &mut entry, false)
                .await?;
        }

        self.run_validators().await?;
        self.finish_cleanly()?;
        Ok(self.run_log.clone())
    }

    /// Resumes after an external interruption (spec §4.5.6): the job that
    /// was pending when the process died is re-pulled from the job
    /// source and driven straight into the post-mortem phase instead of
    /// through `Setup`/`Run`. Returns how many jobs (including the
    /// resumed one) were run to completion afterward.
    pub async fn run_interrupted(&mut self) -> Result<usize, CustodianError> {
        let mut completed = 0;

        if let Some(job) = self.jobs.next().await? {
            let job_id = JobId::new(job.name());
            let resumes_prior_entry = self.run_log.last().is_some_and(|e| e.job == job.name());
            let mut entry = if resumes_prior_entry {
                self.run_log.pop().unwrap_or_else(|| RunLogEntry::new(job.name()))
            } else {
                RunLogEntry::new(job.name())
            };

            self.drive_job(job.as_ref(), &job_id, &mut entry, true)
                .await?;
            completed += 1;
        }

        while let Some(job) = self.jobs.next().await? {
            let job_id = JobId::new(job.name());
            let mut entry = RunLogEntry::new(job.name());
            self.drive_job(job.as_ref(), &job_id, &mut entry, false)
                .await?;
            completed += 1;
        }

        self.run_validators().await?;
        self.finish_cleanly()?;
        Ok(completed)
    }

    async fn drive_job(
        &mut self,
        job: &dyn custodian_core::Job,
        job_id: &JobId,
        entry: &mut RunLogEntry,
        interrupted: bool,
    ) -> Result<(), CustodianError> {
        let scratch_guard = match &self.config.scratch_dir {
            Some(root) => scratch::enter(root, &self.directory)?,
            None => None,
        };
        let dir = scratch_guard
            .as_ref()
            .map(scratch::ScratchGuard::dir)
            .unwrap_or(&self.directory)
            .to_path_buf();

        let mut ctx = AttemptContext {
            job,
            job_id,
            handlers: &self.handlers,
            config: &self.config,
            modder: &self.modder,
            dicts: &mut self.dicts,
            cache_registry: &self.cache_registry,
            n_applied_corrections: &mut self.n_applied_corrections,
            total_errors: &mut self.total_errors,
            max_errors_per_job: self.config.max_errors_per_job,
            dir: &dir,
        };

        let result = if interrupted {
            run_interrupted_attempt(&mut ctx, entry).await
        } else {
            run_attempt(&mut ctx, entry).await
        };

        self.run_log.push(entry.clone());
        self.persist()?;

        if let Some(guard) = scratch_guard {
            guard.exit()?;
        }

        result?;

        if self.config.checkpoint {
            checkpoint::write_checkpoint(&self.directory)
                .map_err(|e| CustodianError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        }

        Ok(())
    }

    async fn run_validators(&mut self) -> Result<(), CustodianError> {
        self.cache_registry.clear_all();
        for validator in &self.validators {
            if validator.check(&self.directory).await? {
                if let Some(last) = self.run_log.last_mut() {
                    last.validator = Some(validator.id().clone());
                }
                self.persist()?;
                let job = self
                    .run_log
                    .last()
                    .map(|e| JobId::new(e.job.clone()))
                    .unwrap_or_else(|| JobId::new("<none>"));
                return Err(CustodianError::ValidationError {
                    job,
                    validator: validator.id().clone(),
                });
            }
        }
        Ok(())
    }

    fn finish_cleanly(&self) -> Result<(), CustodianError> {
        if self.config.gzipped_output {
            gzip_dir(&self.directory)?;
        }
        if self.config.checkpoint {
            checkpoint::cleanup_all(&self.directory)?;
        }
        Ok(())
    }

    /// Persists the run log as `custodian.json` (spec §4.5.7), overwriting
    /// prior contents on every completed attempt.
    fn persist(&self) -> Result<(), CustodianError> {
        let path = self.directory.join(RUN_LOG_FILE);
        let json = serde_json::to_string_pretty(&self.run_log)
            .map_err(|e| CustodianError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn load_run_log(directory: &Path) -> Result<Option<Vec<RunLogEntry>>, CustodianError> {
    let path = directory.join(RUN_LOG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    let entries = serde_json::from_slice(&bytes)
        .map_err(|e| CustodianError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    Ok(Some(entries))
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
