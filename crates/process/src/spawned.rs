// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SpawnedProcess`]: the concrete [`ProcessHandle`] a [`Job::run`]
//! implementation returns, wrapping `tokio::process::Child`.
//!
//! [`Job::run`]: custodian_core::Job::run

use async_trait::async_trait;
use tokio::process::{Child, Command};

use custodian_core::ProcessHandle;

pub struct SpawnedProcess {
    child: Child,
}

impl SpawnedProcess {
    pub fn spawn(mut command: Command) -> std::io::Result<Self> {
        Ok(Self {
            child: command.spawn()?,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub(crate) fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }
}

#[async_trait]
impl ProcessHandle for SpawnedProcess {
    async fn poll(&mut self) -> std::io::Result<Option<i32>> {
        match self.child.try_wait()? {
            Some(status) => Ok(Some(status.code().unwrap_or(-1))),
            None => Ok(None),
        }
    }

    async fn wait(&mut self) -> std::io::Result<i32> {
        let status = self.child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
#[path = "spawned_tests.rs"]
mod tests;
