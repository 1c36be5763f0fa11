// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios against the full `Supervisor`, each driving an
//! `ExampleJob`/`ExampleHandler` pair that accumulates a running sum into
//! a shared counter.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use custodian_core::{
    CorrectionRecord, CustodianError, Handler, HandlerConfig, HandlerId, Job, Mutation, OpMap,
    ProcessHandle, SupervisorConfig, Validator, ValidatorId,
};
use custodian_engine::{Supervisor, VecJobSource};
use custodian_snapshot::SharedCache;

struct FixedExitHandle(i32);

#[async_trait]
impl ProcessHandle for FixedExitHandle {
    async fn poll(&mut self) -> std::io::Result<Option<i32>> {
        Ok(Some(self.0))
    }
    async fn wait(&mut self) -> std::io::Result<i32> {
        Ok(self.0)
    }
}

/// Adds a fixed contribution to a running sum on every attempt. The
/// counter is owned per job instance, so it starts fresh for each job but
/// persists across that job's own retries.
struct ExampleJob {
    name: String,
    counter: Arc<AtomicI64>,
    exit_code: i32,
}

impl ExampleJob {
    fn new(index: usize, counter: Arc<AtomicI64>) -> Self {
        Self {
            name: format!("example-job-{index}"),
            counter,
            exit_code: 0,
        }
    }
}

#[async_trait]
impl Job for ExampleJob {
    fn name(&self) -> &str {
        &self.name
    }
    async fn setup(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
    async fn run(&self, _dir: &Path) -> std::io::Result<Box<dyn ProcessHandle>> {
        self.counter.fetch_add(20, Ordering::SeqCst);
        Ok(Box::new(FixedExitHandle(self.exit_code)))
    }
    async fn postprocess(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
    async fn terminate(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

fn job_source(n_jobs: usize) -> Box<dyn custodian_engine::JobSource> {
    let jobs = (0..n_jobs)
        .map(|i| Box::new(ExampleJob::new(i, Arc::new(AtomicI64::new(0)))) as Box<dyn Job>)
        .collect();
    Box::new(VecJobSource::new(jobs))
}

/// Fires while the shared running sum is under 50, correcting by bumping
/// that same counter so a later attempt clears the threshold.
struct ExampleHandler {
    id: HandlerId,
    config: HandlerConfig,
    counter: Arc<AtomicI64>,
}

impl ExampleHandler {
    fn new(config: HandlerConfig, counter: Arc<AtomicI64>) -> Arc<dyn Handler> {
        Arc::new(Self {
            id: HandlerId::new("example-handler"),
            config,
            counter,
        })
    }
}

#[async_trait]
impl Handler for ExampleHandler {
    fn id(&self) -> &HandlerId {
        &self.id
    }
    fn config(&self) -> &HandlerConfig {
        &self.config
    }
    async fn check(&self, _dir: &Path) -> std::io::Result<bool> {
        Ok(self.counter.load(Ordering::SeqCst) < 50)
    }
    async fn correct(&self, _dir: &Path) -> std::io::Result<CorrectionRecord> {
        self.counter.fetch_add(20, Ordering::SeqCst);
        let mut action = OpMap::new();
        action.insert("_set".into(), serde_json::json!({"corrected": true}));
        Ok(CorrectionRecord::corrected(
            self.id.clone(),
            vec!["total < 50".into()],
            vec![Mutation::Dict {
                dict: "example".into(),
                action,
            }],
        ))
    }
}

fn run_config(max_errors: u32, max_errors_per_job: Option<u32>) -> SupervisorConfig {
    SupervisorConfig {
        max_errors,
        max_errors_per_job,
        ..SupervisorConfig::default()
    }
}

#[tokio::test]
async fn every_job_completes_within_the_shared_error_budget() {
    let n_jobs = 100;
    let counter = Arc::new(AtomicI64::new(0));
    let jobs: Vec<Box<dyn Job>> = (0..n_jobs)
        .map(|i| Box::new(ExampleJob::new(i, counter.clone())) as Box<dyn Job>)
        .collect();
    let handler = ExampleHandler::new(
        HandlerConfig {
            is_terminating: false,
            ..HandlerConfig::default()
        },
        counter.clone(),
    );

    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        Box::new(VecJobSource::new(jobs)),
        vec![handler],
        Vec::new(),
        run_config(n_jobs as u32, None),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    // Reusing one shared counter across jobs means later jobs start above
    // the threshold and need no correction at all; the invariant under
    // test is only that the run completes and never exceeds the budget.
    let log = supervisor.run().await.unwrap();
    assert_eq!(log.len(), n_jobs);
    let total_corrections: usize = log.iter().map(|e| e.corrections.len()).sum();
    assert!(total_corrections <= n_jobs);
}

#[tokio::test]
async fn the_run_wide_budget_aborts_on_the_first_jobs_correction() {
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        job_source(100),
        vec![ExampleHandler::new(
            HandlerConfig {
                is_terminating: false,
                ..HandlerConfig::default()
            },
            Arc::new(AtomicI64::new(0)),
        )],
        Vec::new(),
        run_config(1, Some(10)),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let error = supervisor.run().await.unwrap_err();
    assert!(matches!(error, CustodianError::MaxCorrectionsError { .. }));
}

#[tokio::test]
async fn the_per_job_budget_aborts_before_the_run_wide_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        job_source(100),
        vec![ExampleHandler::new(
            HandlerConfig {
                is_terminating: false,
                ..HandlerConfig::default()
            },
            Arc::new(AtomicI64::new(0)),
        )],
        Vec::new(),
        run_config(100, Some(1)),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let error = supervisor.run().await.unwrap_err();
    assert!(matches!(error, CustodianError::MaxCorrectionsPerJobError { .. }));
}

/// Always fires and is always correctable, so only its own per-handler cap
/// can stop it.
struct RelentlessHandler {
    id: HandlerId,
    config: HandlerConfig,
}

#[async_trait]
impl Handler for RelentlessHandler {
    fn id(&self) -> &HandlerId {
        &self.id
    }
    fn config(&self) -> &HandlerConfig {
        &self.config
    }
    async fn check(&self, _dir: &Path) -> std::io::Result<bool> {
        Ok(true)
    }
    async fn correct(&self, _dir: &Path) -> std::io::Result<CorrectionRecord> {
        Ok(CorrectionRecord::corrected(
            self.id.clone(),
            vec!["always wrong".into()],
            Vec::new(),
        ))
    }
}

#[tokio::test]
async fn a_handler_at_its_correction_cap_raises_instead_of_looping_forever() {
    let handler: Arc<dyn Handler> = Arc::new(RelentlessHandler {
        id: HandlerId::new("relentless"),
        config: HandlerConfig {
            is_terminating: false,
            max_num_corrections: Some(2),
            raise_on_max: true,
            ..HandlerConfig::default()
        },
    });
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        job_source(1),
        vec![handler],
        Vec::new(),
        run_config(1_000, Some(1_000)),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let error = supervisor.run().await.unwrap_err();
    assert!(matches!(
        error,
        CustodianError::MaxCorrectionsPerHandlerError { .. }
    ));
}

/// Detects an error it cannot correct (`actions: None`).
struct UncorrectableHandler {
    id: HandlerId,
    config: HandlerConfig,
    fired: Arc<AtomicBool>,
}

#[async_trait]
impl Handler for UncorrectableHandler {
    fn id(&self) -> &HandlerId {
        &self.id
    }
    fn config(&self) -> &HandlerConfig {
        &self.config
    }
    async fn check(&self, _dir: &Path) -> std::io::Result<bool> {
        Ok(!self.fired.load(Ordering::SeqCst))
    }
    async fn correct(&self, _dir: &Path) -> std::io::Result<CorrectionRecord> {
        self.fired.store(true, Ordering::SeqCst);
        Ok(CorrectionRecord::uncorrectable(
            self.id.clone(),
            vec!["unrecoverable".into()],
        ))
    }
}

#[tokio::test]
async fn an_uncorrectable_handler_that_raises_aborts_on_its_first_attempt() {
    let handler: Arc<dyn Handler> = Arc::new(UncorrectableHandler {
        id: HandlerId::new("uncorrectable"),
        config: HandlerConfig {
            is_terminating: false,
            raises_runtime_error: true,
            ..HandlerConfig::default()
        },
        fired: Arc::new(AtomicBool::new(false)),
    });
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        job_source(1),
        vec![handler],
        Vec::new(),
        run_config(100, None),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let error = supervisor.run().await.unwrap_err();
    assert!(matches!(error, CustodianError::NonRecoverableError { .. }));
}

#[tokio::test]
async fn an_uncorrectable_handler_that_does_not_raise_lets_the_run_finish() {
    let handler: Arc<dyn Handler> = Arc::new(UncorrectableHandler {
        id: HandlerId::new("uncorrectable"),
        config: HandlerConfig {
            is_terminating: false,
            raises_runtime_error: false,
            ..HandlerConfig::default()
        },
        fired: Arc::new(AtomicBool::new(false)),
    });
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        job_source(1),
        vec![handler],
        Vec::new(),
        run_config(100, None),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let log = supervisor.run().await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].corrections.len(), 1);
    assert!(!log[0].corrections[0].is_correctable());
    assert_eq!(log[0].corrections[0].handler, HandlerId::new("uncorrectable"));
}

/// Looks a fixed key up through a shared cache twice per `check`, so a
/// working cache means only one real computation happens per check call
/// no matter how many attempts run.
struct CachingHandler {
    id: HandlerId,
    config: HandlerConfig,
    cache: SharedCache<String, i64>,
    computations: Arc<AtomicI64>,
    fires_remaining: AtomicI64,
}

#[async_trait]
impl Handler for CachingHandler {
    fn id(&self) -> &HandlerId {
        &self.id
    }
    fn config(&self) -> &HandlerConfig {
        &self.config
    }
    async fn check(&self, _dir: &Path) -> std::io::Result<bool> {
        for _ in 0..2 {
            self.cache.get_or_insert_with("key".to_string(), || {
                self.computations.fetch_add(1, Ordering::SeqCst);
                42
            });
        }
        Ok(self.fires_remaining.load(Ordering::SeqCst) > 0)
    }
    async fn correct(&self, _dir: &Path) -> std::io::Result<CorrectionRecord> {
        self.fires_remaining.fetch_sub(1, Ordering::SeqCst);
        Ok(CorrectionRecord::corrected(
            self.id.clone(),
            vec!["caching".into()],
            Vec::new(),
        ))
    }
}

#[tokio::test]
async fn a_handlers_registered_cache_is_reachable_and_flushed_between_attempts() {
    let cache: SharedCache<String, i64> = SharedCache::new(4);
    let computations = Arc::new(AtomicI64::new(0));
    let handler: Arc<dyn Handler> = Arc::new(CachingHandler {
        id: HandlerId::new("caching"),
        config: HandlerConfig {
            is_terminating: false,
            ..HandlerConfig::default()
        },
        cache: cache.clone(),
        computations: computations.clone(),
        fires_remaining: AtomicI64::new(2),
    });
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        job_source(1),
        vec![handler],
        Vec::new(),
        run_config(100, None),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    supervisor.cache_registry_mut().register(cache.clone());

    let log = supervisor.run().await.unwrap();
    assert_eq!(log.len(), 1);
    // 3 checks total (2 corrections then a clean one); a working cache
    // means the second lookup within each check is a hit, not a second
    // computation.
    assert_eq!(computations.load(Ordering::SeqCst), 3);
    // Flushed by the attempt loop's `clear_all` before the run finishes.
    assert!(cache.is_empty());
}

struct AlwaysInvalid(ValidatorId);

#[async_trait]
impl Validator for AlwaysInvalid {
    fn id(&self) -> &ValidatorId {
        &self.0
    }
    async fn check(&self, _dir: &Path) -> std::io::Result<bool> {
        Ok(true)
    }
}

#[tokio::test]
async fn a_validator_that_always_rejects_aborts_after_every_job_completes() {
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        job_source(3),
        Vec::new(),
        vec![Arc::new(AlwaysInvalid(ValidatorId::new("always-invalid"))) as Arc<dyn Validator>],
        SupervisorConfig::default(),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let error = supervisor.run().await.unwrap_err();
    assert!(matches!(error, CustodianError::ValidationError { .. }));
}

struct ExitCodeJob {
    exit_code: i32,
}

#[async_trait]
impl Job for ExitCodeJob {
    fn name(&self) -> &str {
        "exit-code-job"
    }
    async fn setup(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
    async fn run(&self, _dir: &Path) -> std::io::Result<Box<dyn ProcessHandle>> {
        Ok(Box::new(FixedExitHandle(self.exit_code)))
    }
    async fn postprocess(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
    async fn terminate(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn a_nonzero_exit_aborts_the_run_by_default() {
    let jobs: Vec<Box<dyn Job>> = vec![Box::new(ExitCodeJob { exit_code: 1 })];
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        Box::new(VecJobSource::new(jobs)),
        Vec::new(),
        Vec::new(),
        SupervisorConfig::default(),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let error = supervisor.run().await.unwrap_err();
    assert!(matches!(error, CustodianError::ReturnCodeError { code: 1, .. }));
}

#[tokio::test]
async fn a_nonzero_exit_is_tolerated_when_configured_to_be() {
    let jobs: Vec<Box<dyn Job>> = vec![Box::new(ExitCodeJob { exit_code: 1 })];
    let dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::new(
        Box::new(VecJobSource::new(jobs)),
        Vec::new(),
        Vec::new(),
        SupervisorConfig {
            terminate_on_nonzero_returncode: false,
            ..SupervisorConfig::default()
        },
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let log = supervisor.run().await.unwrap();
    assert_eq!(log.len(), 1);
}
