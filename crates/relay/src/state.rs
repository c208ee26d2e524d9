// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Four-state lifecycle shared by connectors and routers.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;

/// Lifecycle of a managed subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Down,
    Startup,
    Up,
    Shutdown,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "DOWN",
            Self::Startup => "STARTUP",
            Self::Up => "UP",
            Self::Shutdown => "SHUTDOWN",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle cell with interruptible sleeps and a transition barrier.
///
/// Legal transitions are DOWN→STARTUP→UP→SHUTDOWN→DOWN. Entering STARTUP or
/// SHUTDOWN arms the barrier; reaching UP or DOWN releases it. Every accepted
/// transition wakes pending [`State::sleep`] calls, so a worker stuck in a
/// long backoff notices a shutdown immediately.
pub struct State {
    tx: watch::Sender<Lifecycle>,
}

impl State {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Lifecycle::Down);
        Self { tx }
    }

    /// Current lifecycle value.
    pub fn current(&self) -> Lifecycle {
        *self.tx.borrow()
    }

    /// Attempt a transition. Illegal changes return `false` with no side
    /// effect and no wakeup; re-setting the current value is an accepted
    /// no-op.
    pub fn advance(&self, next: Lifecycle) -> bool {
        let mut accepted = false;
        self.tx.send_if_modified(|current| {
            if *current == next {
                accepted = true;
                return false;
            }
            let legal = matches!(
                (*current, next),
                (Lifecycle::Down, Lifecycle::Startup)
                    | (Lifecycle::Startup, Lifecycle::Up)
                    | (Lifecycle::Up, Lifecycle::Shutdown)
                    | (Lifecycle::Shutdown, Lifecycle::Down)
            );
            if !legal {
                return false;
            }
            accepted = true;
            *current = next;
            true
        });
        accepted
    }

    /// Sleep for `dur`, returning early on any lifecycle transition.
    pub async fn sleep(&self, dur: Duration) {
        let mut rx = self.tx.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(dur) => {}
            _ = rx.changed() => {}
        }
    }

    /// Block until the subsystem settles in UP or DOWN.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close under us.
        let _ = rx.wait_for(|s| matches!(s, Lifecycle::Up | Lifecycle::Down)).await;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
