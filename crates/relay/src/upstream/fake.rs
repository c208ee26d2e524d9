// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthetic upstream for local runs and tests. Obeys the same contract as
//! the firehose transport without touching the network.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use super::event::StreamEvent;
use crate::credential::CredentialSet;

/// Knobs for the synthetic stream, shared across rebuilt transports so tests
/// and the restart sweep can observe session churn.
#[derive(Debug, Clone)]
pub struct FakeSpec {
    /// Count of successful opens across every transport built from this spec.
    pub opens: Arc<AtomicU32>,
    /// Pace base between emitted events, in milliseconds.
    pub pace_ms: u64,
}

impl Default for FakeSpec {
    fn default() -> Self {
        Self { opens: Arc::new(AtomicU32::new(0)), pace_ms: 1000 }
    }
}

/// In-memory stream emitting activity for random followed accounts.
pub struct FakeTransport {
    spec: FakeSpec,
    follow: Vec<String>,
    open: bool,
}

impl FakeTransport {
    pub fn new(spec: FakeSpec) -> Self {
        Self { spec, follow: Vec::new(), open: false }
    }

    pub fn open(&mut self, _creds: &CredentialSet, follow: &[String]) -> anyhow::Result<()> {
        if follow.is_empty() {
            return Ok(());
        }
        self.follow = follow.to_vec();
        self.open = true;
        self.spec.opens.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn up(&self) -> bool {
        self.open
    }

    /// Emit an event for a random followed account after a pseudo-random
    /// pace interval.
    pub async fn next(&mut self) -> anyhow::Result<Option<StreamEvent>> {
        if !self.open {
            return Ok(None);
        }
        let (pause, pick) = {
            let mut rng = rand::rng();
            let spread: u64 = rng.random_range(1..=9);
            let per_account = self.spec.pace_ms.max(1) / self.follow.len().max(1) as u64;
            (
                Duration::from_millis(per_account.max(1) * spread),
                rng.random_range(0..self.follow.len()),
            )
        };
        tokio::time::sleep(pause).await;
        Ok(Some(StreamEvent {
            scan_user_id: Some(self.follow[pick].clone()),
            retweet_of_user_id: None,
            mentions: Vec::new(),
        }))
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
