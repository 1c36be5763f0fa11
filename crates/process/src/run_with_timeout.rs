// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot bounded subprocess execution for `Setup`/`Postprocess`-adjacent
//! commands: runs to completion or is killed once a deadline passes.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::error::ProcessError;

pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ProcessError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProcessError::Spawn {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(ProcessError::Timeout {
            description: description.to_string(),
            timeout,
        }),
    }
}

#[cfg(test)]
#[path = "run_with_timeout_tests.rs"]
mod tests;
