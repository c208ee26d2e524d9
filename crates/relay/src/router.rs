// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: translates scanner requests into account-store reads and
//! writes and answers with canonical scan/reason bodies.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use axum::body::Bytes;
use axum::extract::{Path, State as AxumState};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use tracing::{info, warn};

use crate::account::{AccountEntry, AccountStore, Monitoring};
use crate::credential::{Credential, CredentialSet};
use crate::manager::{Manager, ManagerKind};
use crate::state::{Lifecycle, State};

// -- Canonical responses -------------------------------------------------------

/// Scanner verdict carried in the response `Message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scan {
    Yes,
    No,
}

impl Scan {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// Canonical reason strings carried in the response `Reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    NotMonitored,
    MonitoringOff,
    FirstScan,
    NewContent,
    NoNewContent,
    JsonUnparseable,
    JsonInvalid,
    CredentialMismatch,
    AccountMissing,
    RouteDown,
    TryAnotherMethod,
    StoreFailure,
}

impl Reason {
    fn as_str(&self) -> &'static str {
        match self {
            Self::NotMonitored => "not monitored",
            Self::MonitoringOff => "monitoring turned off",
            Self::FirstScan => "first scan since monitor started",
            Self::NewContent => "new content has arrived",
            Self::NoNewContent => "no new content",
            Self::JsonUnparseable => "cannot parse",
            Self::JsonInvalid => "unexpected json",
            Self::CredentialMismatch => "unexpected credential",
            Self::AccountMissing => "account is not monitored",
            Self::RouteDown => "route down",
            Self::TryAnotherMethod => "try another method",
            Self::StoreFailure => "could not store account for monitoring",
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct ScanBody {
    code: u16,
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    reason: &'static str,
}

fn encode_body(code: u16, scan: Option<Scan>, reason: Reason) -> Bytes {
    let body = ScanBody {
        code,
        message: scan.map(|s| s.as_str()).unwrap_or(""),
        reason: reason.as_str(),
    };
    serde_json::to_vec(&body).map(Bytes::from).unwrap_or_default()
}

/// Every (code, scan, reason) combination the handlers emit, serialized once.
static CANNED: LazyLock<HashMap<(u16, Option<Scan>, Reason), Bytes>> = LazyLock::new(|| {
    const CANON: &[(u16, Option<Scan>, Reason)] = &[
        (200, Some(Scan::Yes), Reason::NotMonitored),
        (200, Some(Scan::Yes), Reason::MonitoringOff),
        (200, Some(Scan::Yes), Reason::FirstScan),
        (200, Some(Scan::Yes), Reason::NewContent),
        (200, Some(Scan::No), Reason::NoNewContent),
        (201, Some(Scan::Yes), Reason::NotMonitored),
        (201, Some(Scan::Yes), Reason::MonitoringOff),
        (201, Some(Scan::Yes), Reason::FirstScan),
        (201, Some(Scan::Yes), Reason::NewContent),
        (201, Some(Scan::No), Reason::NoNewContent),
        (400, None, Reason::JsonUnparseable),
        (400, None, Reason::JsonInvalid),
        (401, None, Reason::CredentialMismatch),
        (404, None, Reason::AccountMissing),
        (404, None, Reason::RouteDown),
        (405, None, Reason::TryAnotherMethod),
        (500, None, Reason::StoreFailure),
    ];
    CANON
        .iter()
        .map(|&(code, scan, reason)| ((code, scan, reason), encode_body(code, scan, reason)))
        .collect()
});

fn respond(code: u16, scan: Option<Scan>, reason: Reason) -> Response {
    let bytes = match CANNED.get(&(code, scan, reason)) {
        Some(body) => body.clone(),
        None => {
            info!(code, reason = reason.as_str(), "serializing a non-canonical response");
            encode_body(code, scan, reason)
        }
    };
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
}

// -- Scan decision -------------------------------------------------------------

/// The scan-decision table; rows are evaluated in order, first match wins.
pub(crate) fn scan_decision(connector: Lifecycle, entry: &AccountEntry) -> (Scan, Reason) {
    if connector != Lifecycle::Up {
        (Scan::Yes, Reason::MonitoringOff)
    } else if entry.monitoring() == Monitoring::Unmonitored {
        (Scan::Yes, Reason::NotMonitored)
    } else if !entry.scanner_seen() {
        (Scan::Yes, Reason::FirstScan)
    } else if entry.is_updated() {
        (Scan::Yes, Reason::NewContent)
    } else {
        (Scan::No, Reason::NoNewContent)
    }
}

// -- Manager -------------------------------------------------------------------

/// Manager exposing one stream's scan API at `/{name}/{id}`.
pub struct Router {
    name: String,
    state: Arc<State>,
    store: Arc<AccountStore>,
    credential: Arc<Credential>,
    connector_state: Arc<State>,
}

impl Router {
    pub fn new(
        name: &str,
        store: Arc<AccountStore>,
        credential: Arc<Credential>,
        connector_state: Arc<State>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            state: Arc::new(State::new()),
            store,
            credential,
            connector_state,
        }
    }
}

impl Manager for Router {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ManagerKind {
        ManagerKind::Router
    }

    /// Routers have no worker task; startup settles the state directly.
    fn startup(&self) -> bool {
        self.state.advance(Lifecycle::Up)
    }

    fn shutdown(&self) -> bool {
        self.state.advance(Lifecycle::Down)
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

// -- Handlers ------------------------------------------------------------------

/// Mount every stream router at `/{name}/{id}`.
pub fn build_app(routers: &[Arc<Router>]) -> axum::Router {
    let mut app = axum::Router::new();
    for router in routers {
        let path = format!("/{}/{{id}}", router.name);
        app = app.merge(
            axum::Router::new().route(&path, any(scan_handler)).with_state(Arc::clone(router)),
        );
    }
    app
}

async fn scan_handler(
    AxumState(router): AxumState<Arc<Router>>,
    Path(account_id): Path<String>,
    method: Method,
    body: Bytes,
) -> Response {
    if router.state.current() != Lifecycle::Up {
        return respond(404, None, Reason::RouteDown);
    }
    if method == Method::PUT {
        handle_put(&router, &account_id, &body)
    } else if method == Method::GET {
        handle_get(&router, &account_id)
    } else if method == Method::HEAD {
        handle_head(&router, &account_id)
    } else {
        respond(405, None, Reason::TryAnotherMethod)
    }
}

fn handle_put(router: &Router, account_id: &str, body: &[u8]) -> Response {
    let Ok(request) = serde_json::from_slice::<CredentialSet>(body) else {
        return respond(400, None, Reason::JsonUnparseable);
    };
    if !request.valid() {
        return respond(400, None, Reason::JsonInvalid);
    }
    if router.credential.stale() {
        info!(stream = %router.name, "accepting a credential refresh");
        router.credential.update(&request);
    } else if router.credential.changed(&request) {
        warn!(stream = %router.name, account = %account_id, "rejecting a mismatched credential");
        return respond(401, None, Reason::CredentialMismatch);
    }

    let (entry, created) = match router.store.get(account_id) {
        Some(entry) => (entry, false),
        None => {
            let _ = router.store.add(account_id);
            // A concurrent removal can take the entry between insert and
            // lookup.
            match router.store.get(account_id) {
                Some(entry) => (entry, true),
                None => return respond(500, None, Reason::StoreFailure),
            }
        }
    };
    let (scan, reason) = scan_decision(router.connector_state.current(), &entry);
    entry.set_last_scan();
    respond(if created { 201 } else { 200 }, Some(scan), reason)
}

fn handle_get(router: &Router, account_id: &str) -> Response {
    match router.store.get(account_id) {
        Some(entry) => {
            let (scan, reason) = scan_decision(router.connector_state.current(), &entry);
            respond(200, Some(scan), reason)
        }
        None => respond(404, None, Reason::AccountMissing),
    }
}

fn handle_head(router: &Router, account_id: &str) -> Response {
    let status =
        if router.store.get(account_id).is_some() { StatusCode::OK } else { StatusCode::NOT_FOUND };
    (status, [(header::CONTENT_TYPE, "application/json")]).into_response()
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
