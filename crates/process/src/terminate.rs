// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graceful-terminate-then-kill (spec §3 "Job.Terminate", §5): send a
//! SIGTERM-equivalent, wait a bounded interval, then force kill.

use std::time::Duration;

use crate::spawned::SpawnedProcess;

/// Minimum grace period spec §5 requires between SIGTERM-equivalent and
/// SIGKILL-equivalent.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Best-effort graceful shutdown of `process`, escalating to a hard kill
/// if it hasn't exited within `grace_period`.
pub async fn terminate(process: &mut SpawnedProcess, grace_period: Duration) -> std::io::Result<()> {
    if let Some(pid) = process.id() {
        send_sigterm(pid).await;
    }

    match tokio::time::timeout(grace_period, process.child_mut().wait()).await {
        Ok(_) => Ok(()),
        Err(_elapsed) => {
            process.child_mut().start_kill()?;
            process.child_mut().wait().await?;
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn send_sigterm(pid: u32) {
    // No direct libc/nix dependency: shell out to `kill`, same portable
    // approach as every other one-shot external command this crate runs.
    let result = tokio::process::Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .await;
    if let Err(e) = result {
        tracing::warn!(pid, error = %e, "failed to send SIGTERM, will hard-kill after grace period");
    }
}

#[cfg(not(unix))]
async fn send_sigterm(_pid: u32) {
    tracing::warn!("graceful terminate is unix-only on this platform, hard-killing after grace period");
}

#[cfg(test)]
#[path = "terminate_tests.rs"]
mod tests;
