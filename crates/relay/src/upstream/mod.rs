// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream activity stream: wire decode plus the real and synthetic
//! transports behind one polymorphic surface.

pub mod event;
pub mod fake;
pub mod firehose;

use std::time::Duration;

use self::event::StreamEvent;
use self::fake::{FakeSpec, FakeTransport};
use self::firehose::FirehoseTransport;
use crate::credential::CredentialSet;

/// Recipe for constructing a transport. The connector builds a fresh
/// transport for every filter-loop run, so the spec must be cloneable.
#[derive(Debug, Clone)]
pub enum TransportSpec {
    Firehose { url: String, read_timeout: Duration },
    Fake(FakeSpec),
}

impl TransportSpec {
    pub fn build(&self) -> Transport {
        match self {
            Self::Firehose { url, read_timeout } => {
                Transport::Firehose(FirehoseTransport::new(url.clone(), *read_timeout))
            }
            Self::Fake(spec) => Transport::Fake(FakeTransport::new(spec.clone())),
        }
    }
}

/// A live upstream session, real or synthetic.
pub enum Transport {
    Firehose(FirehoseTransport),
    Fake(FakeTransport),
}

impl Transport {
    /// Establish an authenticated session subscribed to `follow`. An empty
    /// follow-set is a no-op that leaves the transport down.
    pub async fn open(&mut self, creds: &CredentialSet, follow: &[String]) -> anyhow::Result<()> {
        match self {
            Self::Firehose(t) => t.open(creds, follow).await,
            Self::Fake(t) => t.open(creds, follow),
        }
    }

    pub fn up(&self) -> bool {
        match self {
            Self::Firehose(t) => t.up(),
            Self::Fake(t) => t.up(),
        }
    }

    /// Next event. `Ok(None)` signals the transport is down without error so
    /// the filter loop can re-check its state; any `Err` is terminal for the
    /// session.
    pub async fn next(&mut self) -> anyhow::Result<Option<StreamEvent>> {
        match self {
            Self::Firehose(t) => t.next().await,
            Self::Fake(t) => t.next().await,
        }
    }

    /// Release the session; safe to call when down.
    pub fn close(&mut self) {
        match self {
            Self::Firehose(t) => t.close(),
            Self::Fake(t) => t.close(),
        }
    }
}
