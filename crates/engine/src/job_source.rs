// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull-based job iteration: the supervisor asks for one job at a time
//! rather than holding the whole sequence in memory, so a lazily-produced
//! or unbounded job sequence works the same as a fixed list.

use std::collections::VecDeque;

use async_trait::async_trait;

use custodian_core::Job;

/// Yields jobs one at a time. Implementations may compute the next job
/// lazily; the supervisor never asks for more than one ahead.
#[async_trait]
pub trait JobSource: Send {
    async fn next(&mut self) -> std::io::Result<Option<Box<dyn Job>>>;
}

/// A [`JobSource`] over an already-materialized list, for callers who do
/// have the whole sequence up front.
pub struct VecJobSource {
    jobs: VecDeque<Box<dyn Job>>,
}

impl VecJobSource {
    pub fn new(jobs: Vec<Box<dyn Job>>) -> Self {
        Self {
            jobs: jobs.into(),
        }
    }
}

#[async_trait]
impl JobSource for VecJobSource {
    async fn next(&mut self) -> std::io::Result<Option<Box<dyn Job>>> {
        Ok(self.jobs.pop_front())
    }
}

#[cfg(test)]
#[path = "job_source_tests.rs"]
mod tests;
