// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use custodian_core::ProcessHandle;
use std::path::Path;

struct NamedJob(&'static str);

#[async_trait]
impl Job for NamedJob {
    fn name(&self) -> &str {
        self.0
    }
    async fn setup(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
    async fn run(&self, _dir: &Path) -> std::io::Result<Box<dyn ProcessHandle>> {
        unimplemented!("not exercised by this test")
    }
    async fn postprocess(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
    async fn terminate(&self, _dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn yields_jobs_in_order_then_none() {
    let mut source = VecJobSource::new(vec![Box::new(NamedJob("a")), Box::new(NamedJob("b"))]);

    let first = source.next().await.unwrap().unwrap();
    assert_eq!(first.name(), "a");
    let second = source.next().await.unwrap().unwrap();
    assert_eq!(second.name(), "b");
    assert!(source.next().await.unwrap().is_none());
}
