// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Administrative surface: process health, per-stream account listings, and
//! operator-driven account removal.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::Json;
use serde::Serialize;

use crate::manager::{Manager, ManagerKind};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub managers: Vec<ManagerHealth>,
}

#[derive(Debug, Serialize)]
pub struct ManagerHealth {
    pub name: String,
    pub kind: &'static str,
    pub state: &'static str,
    pub accounts: usize,
    pub needs_restart: bool,
}

#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub account_id: String,
    pub monitoring: &'static str,
    pub scanner_seen: bool,
    pub last_scan_dt: i64,
    pub last_update_dt: i64,
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub account_id: String,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

struct ManagementState {
    managers: Vec<Arc<dyn Manager>>,
}

impl ManagementState {
    /// The connector manager carries a stream's store.
    fn stream(&self, name: &str) -> Option<&Arc<dyn Manager>> {
        self.managers.iter().find(|m| m.kind() == ManagerKind::Connector && m.name() == name)
    }
}

/// Build the management routes.
pub fn routes(managers: Vec<Arc<dyn Manager>>) -> axum::Router {
    axum::Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/streams/{name}/accounts", get(list_accounts))
        .route("/api/v1/streams/{name}/accounts/{id}", delete(remove_account))
        .with_state(Arc::new(ManagementState { managers }))
}

/// `GET /api/v1/health`
async fn health(State(s): State<Arc<ManagementState>>) -> impl IntoResponse {
    let managers = s
        .managers
        .iter()
        .map(|m| ManagerHealth {
            name: m.name().to_owned(),
            kind: m.kind().as_str(),
            state: m.state().current().as_str(),
            accounts: m.store().entries().len(),
            needs_restart: m.store().needs_restart(),
        })
        .collect();
    Json(HealthResponse { status: "running".to_owned(), managers })
}

/// `GET /api/v1/streams/{name}/accounts`
async fn list_accounts(
    State(s): State<Arc<ManagementState>>,
    Path(name): Path<String>,
) -> Response {
    let Some(stream) = s.stream(&name) else {
        return not_found("unknown stream");
    };
    let accounts: Vec<AccountInfo> = stream
        .store()
        .entries()
        .iter()
        .map(|e| AccountInfo {
            account_id: e.account_id().to_owned(),
            monitoring: e.monitoring().as_str(),
            scanner_seen: e.scanner_seen(),
            last_scan_dt: e.last_scan_dt(),
            last_update_dt: e.last_update_dt(),
            updated: e.is_updated(),
        })
        .collect();
    Json(accounts).into_response()
}

/// `DELETE /api/v1/streams/{name}/accounts/{id}`
///
/// The removal latches the stream's restart flag, so the next sweep re-opens
/// the upstream subscription without the account.
async fn remove_account(
    State(s): State<Arc<ManagementState>>,
    Path((name, account_id)): Path<(String, String)>,
) -> Response {
    let Some(stream) = s.stream(&name) else {
        return not_found("unknown stream");
    };
    if !stream.store().remove(&account_id) {
        return not_found("unknown account");
    }
    tracing::info!(stream = %name, account = %account_id, "account removed by operator");
    Json(RemoveResponse { account_id, removed: true }).into_response()
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message.to_owned() })).into_response()
}
