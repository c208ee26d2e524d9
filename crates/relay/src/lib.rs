// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tattle: freshness side-channel for downstream content scanners.
//!
//! Maintains one filtered upstream activity stream per subsystem and answers
//! per-account "scan now?" queries over HTTP.

pub mod account;
pub mod config;
pub mod connector;
pub mod credential;
pub mod management;
pub mod manager;
pub mod router;
pub mod state;
pub mod upstream;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::account::AccountStore;
use crate::config::Config;
use crate::connector::Connector;
use crate::credential::Credential;
use crate::manager::Manager;
use crate::router::Router;
use crate::upstream::fake::FakeSpec;
use crate::upstream::TransportSpec;

/// One stream subsystem: a connector/router pair over a shared store and
/// credential.
pub struct Subsystem {
    pub connector: Arc<Connector>,
    pub router: Arc<Router>,
}

impl Subsystem {
    pub fn new(name: &str, spec: TransportSpec) -> Self {
        let store = Arc::new(AccountStore::new(true));
        let credential = Arc::new(Credential::new());
        let connector =
            Arc::new(Connector::new(name, spec, Arc::clone(&store), Arc::clone(&credential)));
        let router = Arc::new(Router::new(name, store, credential, connector.state_handle()));
        Self { connector, router }
    }
}

/// Run the daemon until a shutdown signal arrives.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let firehose = Subsystem::new(
        "tw",
        TransportSpec::Firehose {
            url: config.stream_url.clone(),
            read_timeout: config.read_timeout(),
        },
    );
    let fake = Subsystem::new("fake", TransportSpec::Fake(FakeSpec::default()));

    let managers: Vec<Arc<dyn Manager>> = vec![
        Arc::clone(&firehose.connector) as Arc<dyn Manager>,
        Arc::clone(&firehose.router) as Arc<dyn Manager>,
        Arc::clone(&fake.connector) as Arc<dyn Manager>,
        Arc::clone(&fake.router) as Arc<dyn Manager>,
    ];

    manager::spawn_supervisor(managers.clone(), config.sweep_interval(), shutdown.clone());

    for m in &managers {
        manager::start(m.as_ref()).await;
    }

    let app = router::build_app(&[Arc::clone(&firehose.router), Arc::clone(&fake.router)])
        .merge(management::routes(managers.clone()))
        .layer(tower_http::trace::TraceLayer::new_for_http());
    let listener = TcpListener::bind(&addr).await?;
    info!("tattle listening on {addr}");
    axum::serve(listener, app).with_graceful_shutdown(wait_for_signal(shutdown.clone())).await?;

    // Tear down in registration order.
    for m in &managers {
        manager::stop(m.as_ref()).await;
    }
    anyhow::bail!("terminated by signal")
}

/// Resolve on SIGINT or SIGTERM, cancelling the process token.
async fn wait_for_signal(shutdown: CancellationToken) {
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(err = %e, "cannot install the SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
