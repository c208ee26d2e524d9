// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared credential tuple for one stream subsystem.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// The four-field credential tuple carried by scanner PUTs and handed to the
/// upstream transport opaquely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSet {
    pub app_id: String,
    pub app_secret: String,
    pub api_oauth_token: String,
    pub api_oauth_token_secret: String,
}

impl CredentialSet {
    /// All four fields must be non-empty.
    pub fn valid(&self) -> bool {
        !self.app_id.is_empty()
            && !self.app_secret.is_empty()
            && !self.api_oauth_token.is_empty()
            && !self.api_oauth_token_secret.is_empty()
    }
}

/// Thread-safe credential holder. Constructed stale; the router clears the
/// flag on an accepted PUT, and the connector re-arms it on shutdown so the
/// next PUT after a cold start is taken as a refresh rather than rejected as
/// a mismatch.
pub struct Credential {
    inner: RwLock<Inner>,
}

struct Inner {
    set: CredentialSet,
    stale: bool,
}

impl Credential {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner { set: CredentialSet::default(), stale: true }) }
    }

    pub fn stale(&self) -> bool {
        self.inner.read().stale
    }

    pub fn set_stale(&self) {
        self.inner.write().stale = true;
    }

    /// Replace the tuple and clear the stale flag.
    pub fn update(&self, set: &CredentialSet) {
        let mut inner = self.inner.write();
        inner.set = set.clone();
        inner.stale = false;
    }

    /// True when `set` differs from the stored tuple.
    pub fn changed(&self, set: &CredentialSet) -> bool {
        self.inner.read().set != *set
    }

    /// Clone the tuple for a filter-loop run.
    pub fn snapshot(&self) -> CredentialSet {
        self.inner.read().set.clone()
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
