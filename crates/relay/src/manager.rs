// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polymorphic start/stop over connectors and routers, plus the periodic
//! restart sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::account::AccountStore;
use crate::credential::Credential;
use crate::state::{Lifecycle, State};

/// What a manager drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerKind {
    Connector,
    Router,
}

impl ManagerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connector => "connector",
            Self::Router => "router",
        }
    }
}

/// Capability surface shared by connectors and routers.
pub trait Manager: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> ManagerKind;
    /// Begin work. The worker must eventually drive the state to UP.
    fn startup(&self) -> bool;
    /// Begin teardown. The worker must eventually drive the state to DOWN.
    fn shutdown(&self) -> bool;
    fn state(&self) -> &State;
    fn store(&self) -> &AccountStore;
    fn credential(&self) -> &Credential;
}

/// Drive a manager from DOWN to UP, blocking on the transition barrier.
pub async fn start(m: &dyn Manager) -> Lifecycle {
    if m.state().current() != Lifecycle::Down {
        debug!(name = %m.name(), kind = m.kind().as_str(), "not starting, manager is not down");
        return m.state().current();
    }
    m.state().advance(Lifecycle::Startup);
    m.startup();
    m.state().wait().await;
    let settled = m.state().current();
    info!(name = %m.name(), kind = m.kind().as_str(), state = %settled, "manager started");
    settled
}

/// Drive a manager from UP to DOWN, blocking on the transition barrier.
pub async fn stop(m: &dyn Manager) -> Lifecycle {
    if m.state().current() != Lifecycle::Up {
        debug!(name = %m.name(), kind = m.kind().as_str(), "not stopping, manager is not up");
        return m.state().current();
    }
    m.state().advance(Lifecycle::Shutdown);
    m.shutdown();
    m.state().wait().await;
    let settled = m.state().current();
    info!(name = %m.name(), kind = m.kind().as_str(), state = %settled, "manager stopped");
    settled
}

/// Spawn the periodic sweep that bounces connectors whose follow-set changed
/// since their subscription was opened. Routers are skipped; concurrent
/// follow-set mutations coalesce into one bounce.
pub fn spawn_supervisor(
    managers: Vec<Arc<dyn Manager>>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }
            sweep(&managers).await;
        }
    });
}

async fn sweep(managers: &[Arc<dyn Manager>]) {
    for m in managers {
        if m.kind() != ManagerKind::Connector {
            debug!(name = %m.name(), kind = m.kind().as_str(), "sweep skipping");
            continue;
        }
        if m.store().needs_restart() && m.state().current() == Lifecycle::Up {
            info!(name = %m.name(), "follow-set changed, bouncing connector");
            stop(m.as_ref()).await;
            start(m.as_ref()).await;
            m.store().set_restart(false);
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
