// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;

#[tokio::test]
async fn terminate_lets_a_process_exit_gracefully_within_the_grace_period() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "trap 'exit 0' TERM; sleep 5"]);
    let mut process = SpawnedProcess::spawn(cmd).unwrap();

    terminate(&mut process, Duration::from_secs(2)).await.unwrap();
    assert_eq!(process.poll().await.unwrap(), Some(0));
}

#[tokio::test]
async fn terminate_hard_kills_a_process_that_ignores_sigterm() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "trap '' TERM; sleep 5"]);
    let mut process = SpawnedProcess::spawn(cmd).unwrap();

    terminate(&mut process, Duration::from_millis(300)).await.unwrap();
    assert!(process.poll().await.unwrap().is_some());
}
