// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filter-loop manager: drives the upstream transport and writes activity
//! into the account store.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::account::{AccountStore, Monitoring};
use crate::credential::Credential;
use crate::manager::{Manager, ManagerKind};
use crate::state::{Lifecycle, State};
use crate::upstream::event::StreamEvent;
use crate::upstream::TransportSpec;

/// Pause between follow-set checks while there is nothing to subscribe to.
const EMPTY_FOLLOW_PAUSE: Duration = Duration::from_secs(10);

/// First retry delay after a failed open.
const OPEN_BACKOFF_FLOOR: Duration = Duration::from_secs(1);

/// Retry delay ceiling.
const OPEN_BACKOFF_CEIL: Duration = Duration::from_secs(600);

/// Manager that owns one upstream subscription.
pub struct Connector {
    name: String,
    spec: TransportSpec,
    state: Arc<State>,
    store: Arc<AccountStore>,
    credential: Arc<Credential>,
    cancel: Mutex<CancellationToken>,
}

impl Connector {
    pub fn new(
        name: &str,
        spec: TransportSpec,
        store: Arc<AccountStore>,
        credential: Arc<Credential>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            spec,
            state: Arc::new(State::new()),
            store,
            credential,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Handle to the connector's lifecycle, for the router's scan decision.
    pub fn state_handle(&self) -> Arc<State> {
        Arc::clone(&self.state)
    }
}

impl Manager for Connector {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ManagerKind {
        ManagerKind::Connector
    }

    fn startup(&self) -> bool {
        let cancel = CancellationToken::new();
        *self.cancel.lock() = cancel.clone();
        tokio::spawn(filter(FilterCtx {
            name: self.name.clone(),
            spec: self.spec.clone(),
            state: Arc::clone(&self.state),
            store: Arc::clone(&self.store),
            credential: Arc::clone(&self.credential),
            cancel,
        }));
        true
    }

    fn shutdown(&self) -> bool {
        // Aborts an in-flight transport read; the filter task closes the
        // session and drives the state to DOWN.
        self.cancel.lock().cancel();
        self.credential.set_stale();
        true
    }

    fn state(&self) -> &State {
        &self.state
    }

    fn store(&self) -> &AccountStore {
        &self.store
    }

    fn credential(&self) -> &Credential {
        &self.credential
    }
}

struct FilterCtx {
    name: String,
    spec: TransportSpec,
    state: Arc<State>,
    store: Arc<AccountStore>,
    credential: Arc<Credential>,
    cancel: CancellationToken,
}

/// The filter loop. Credentials and the follow-set are snapshotted once per
/// run; the supervisor bounces the connector whenever either must be
/// re-read.
async fn filter(ctx: FilterCtx) {
    let creds = ctx.credential.snapshot();
    let follow = ctx.store.follow_ids();

    if ctx.state.current() != Lifecycle::Startup {
        debug!(connector = %ctx.name, state = %ctx.state.current(), "filter refused outside startup");
        return;
    }
    let mut transport = ctx.spec.build();
    let mut backoff = OPEN_BACKOFF_FLOOR;
    ctx.state.advance(Lifecycle::Up);
    info!(connector = %ctx.name, accounts = follow.len(), "filter is up");

    loop {
        if ctx.state.current() == Lifecycle::Shutdown {
            break;
        }
        if !transport.up() {
            if follow.is_empty() {
                debug!(connector = %ctx.name, "nothing to follow yet");
                ctx.state.sleep(EMPTY_FOLLOW_PAUSE).await;
                continue;
            }
            let opened = tokio::select! {
                _ = ctx.cancel.cancelled() => break,
                r = transport.open(&creds, &follow) => r,
            };
            match opened {
                Ok(()) => {
                    info!(connector = %ctx.name, accounts = follow.len(), "upstream subscription opened");
                    set_monitoring(&ctx.store, &follow, Monitoring::Monitored);
                    backoff = OPEN_BACKOFF_FLOOR;
                }
                Err(e) => {
                    warn!(connector = %ctx.name, err = %e, retry_in = ?backoff, "upstream open failed");
                    ctx.state.sleep(backoff).await;
                    backoff = (backoff * 2).min(OPEN_BACKOFF_CEIL);
                }
            }
            continue;
        }
        let next = tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            r = transport.next() => r,
        };
        match next {
            Ok(None) => continue,
            Err(e) => {
                warn!(connector = %ctx.name, err = %e, "upstream read failed");
                set_monitoring(&ctx.store, &follow, Monitoring::Unmonitored);
                transport.close();
            }
            Ok(Some(event)) => route_event(&ctx.name, &ctx.store, &event),
        }
    }

    info!(connector = %ctx.name, "shutting down filter");
    transport.close();
    ctx.state.advance(Lifecycle::Down);
}

fn set_monitoring(store: &AccountStore, follow: &[String], monitoring: Monitoring) {
    for account_id in follow {
        if let Some(entry) = store.get(account_id) {
            debug!(account = %entry.account_id(), ?monitoring, "monitoring flag updated");
            entry.set_monitoring(monitoring);
        }
    }
}

/// Classify one event. A single event never updates more than one entry.
pub(crate) fn route_event(name: &str, store: &AccountStore, event: &StreamEvent) {
    let Some(scan_id) = event.scan_user_id.as_deref() else {
        debug!(connector = %name, ?event, "unroutable event without a scan id");
        return;
    };
    if let Some(entry) = store.get(scan_id) {
        debug!(connector = %name, account = %scan_id, "new content");
        entry.set_last_update();
        return;
    }
    let Some(retweet_id) = event.retweet_of_user_id.as_deref() else {
        debug!(connector = %name, account = %scan_id, "dropping event for unknown account");
        return;
    };
    if store.get(retweet_id).is_some() {
        // The followed account receives its own copy through the upstream's
        // native retweet semantics.
        debug!(connector = %name, account = %scan_id, retweet_of = %retweet_id,
            "dropping retweet of a followed account");
        return;
    }
    if event.mentions.iter().any(|m| m == scan_id) {
        // The subscription has not caught up with a freshly registered
        // account; its self-mention is the only trace of the activity.
        info!(connector = %name, account = %scan_id, "registering account seen before its subscription");
        let entry = store.add(scan_id);
        entry.set_last_update();
        return;
    }
    debug!(connector = %name, account = %scan_id, retweet_of = %retweet_id,
        "dropping unroutable event");
}

#[cfg(test)]
#[path = "connector_tests.rs"]
mod tests;
