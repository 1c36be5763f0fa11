// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The background monitor task (spec §4.5.2 step 4, §5).
//!
//! While a job's process is running, this task polls every monitor handler
//! at its own cadence and signals the attempt loop the moment one fires.
//! The attempt loop owns the actual `job.Terminate(dir)` call and the
//! "signal, then terminate, then await exit" ordering — this task only
//! ever observes and reports, it never touches the process itself.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use custodian_core::Handler;

/// Which monitor handler fired, so the attempt loop can drive correction
/// dispatch against it.
#[derive(Debug, Clone, Copy)]
pub struct MonitorHit {
    pub handler_index: usize,
}

/// Polls every monitor handler in `handlers` every `polling_time_step`,
/// respecting each handler's own `monitor_freq` (falling back to
/// `default_monitor_freq` when a handler's is zero). Sends at most one
/// [`MonitorHit`] and then returns; the caller is expected to abort this
/// task's `JoinHandle` once the process it's watching exits on its own.
pub async fn run_monitor(
    handlers: Vec<Arc<dyn Handler>>,
    dir: PathBuf,
    polling_time_step: Duration,
    default_monitor_freq: u32,
    hit_tx: mpsc::Sender<MonitorHit>,
) {
    let mut ticks = vec![0u32; handlers.len()];

    loop {
        tokio::time::sleep(polling_time_step).await;

        for (index, handler) in handlers.iter().enumerate() {
            let config = handler.config();
            if !config.is_monitor {
                continue;
            }
            ticks[index] += 1;
            let freq = if config.monitor_freq == 0 {
                default_monitor_freq.max(1)
            } else {
                config.monitor_freq
            };
            if ticks[index] % freq != 0 {
                continue;
            }

            match handler.check(&dir).await {
                Ok(true) => {
                    let _ = hit_tx.send(MonitorHit { handler_index: index }).await;
                    return;
                }
                Ok(false) => {}
                Err(error) => {
                    tracing::warn!(handler = %handler.id(), %error, "monitor handler check failed");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
