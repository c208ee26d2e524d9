// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-account freshness clocks and the registry shared between the
//! connector (activity writer) and the router (scan writer).

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

/// Whether the upstream subscription currently covers an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monitoring {
    Unmonitored,
    Monitored,
}

impl Monitoring {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unmonitored => "unmonitored",
            Self::Monitored => "monitored",
        }
    }
}

/// Return current epoch seconds.
pub fn epoch_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Freshness bookkeeping for a single account.
///
/// The scan clock and the activity clock advance independently; each is
/// monotonically non-decreasing under its setter. `is_updated` compares both
/// under one read lock so callers always see a consistent snapshot.
pub struct AccountEntry {
    account_id: String,
    inner: RwLock<EntryInner>,
}

struct EntryInner {
    last_scan_dt: i64,
    last_update_dt: i64,
    scanner_seen: bool,
    monitoring: Monitoring,
}

impl AccountEntry {
    fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_owned(),
            inner: RwLock::new(EntryInner {
                last_scan_dt: 0,
                last_update_dt: 0,
                scanner_seen: false,
                monitoring: Monitoring::Unmonitored,
            }),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn monitoring(&self) -> Monitoring {
        self.inner.read().monitoring
    }

    pub fn set_monitoring(&self, monitoring: Monitoring) {
        self.inner.write().monitoring = monitoring;
    }

    /// Has the scanner queried at least once while monitored.
    pub fn scanner_seen(&self) -> bool {
        self.inner.read().scanner_seen
    }

    pub fn last_scan_dt(&self) -> i64 {
        self.inner.read().last_scan_dt
    }

    pub fn last_update_dt(&self) -> i64 {
        self.inner.read().last_update_dt
    }

    /// An account is fresh when activity arrived at or after the last scan.
    pub fn is_updated(&self) -> bool {
        let inner = self.inner.read();
        inner.last_update_dt >= inner.last_scan_dt
    }

    /// Stamp the activity clock. Never moves backwards.
    pub fn set_last_update(&self) {
        let mut inner = self.inner.write();
        let stamped = epoch_secs().max(inner.last_update_dt);
        debug!(account = %self.account_id, from = inner.last_update_dt, to = stamped,
            "stamping last update");
        inner.last_update_dt = stamped;
    }

    /// Stamp the scan clock; the first scan of a monitored account marks the
    /// scanner as seen.
    pub fn set_last_scan(&self) {
        let mut inner = self.inner.write();
        let stamped = epoch_secs().max(inner.last_scan_dt);
        debug!(account = %self.account_id, from = inner.last_scan_dt, to = stamped,
            "stamping last scan");
        inner.last_scan_dt = stamped;
        if !inner.scanner_seen && inner.monitoring == Monitoring::Monitored {
            inner.scanner_seen = true;
        }
    }
}

/// Insertion-ordered account registry with a restart latch read by the
/// supervisor. The key order is the follow-set handed to the upstream
/// transport.
pub struct AccountStore {
    restart_on_change: bool,
    inner: RwLock<StoreInner>,
}

struct StoreInner {
    entries: IndexMap<String, Arc<AccountEntry>>,
    restart: bool,
}

impl AccountStore {
    pub fn new(restart_on_change: bool) -> Self {
        Self {
            restart_on_change,
            inner: RwLock::new(StoreInner { entries: IndexMap::new(), restart: false }),
        }
    }

    /// Idempotent insert. A new entry starts unmonitored with its scan clock
    /// stamped, and latches the restart flag.
    pub fn add(&self, account_id: &str) -> Arc<AccountEntry> {
        let mut inner = self.inner.write();
        if let Some(entry) = inner.entries.get(account_id) {
            return Arc::clone(entry);
        }
        let entry = Arc::new(AccountEntry::new(account_id));
        entry.set_last_scan();
        inner.entries.insert(account_id.to_owned(), Arc::clone(&entry));
        if self.restart_on_change {
            inner.restart = true;
        }
        debug!(account = %account_id, "account registered");
        entry
    }

    /// Order-preserving removal. Latches the restart flag when the account
    /// was present.
    pub fn remove(&self, account_id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.entries.shift_remove(account_id).is_none() {
            return false;
        }
        if self.restart_on_change {
            inner.restart = true;
        }
        debug!(account = %account_id, "account removed");
        true
    }

    pub fn get(&self, account_id: &str) -> Option<Arc<AccountEntry>> {
        self.inner.read().entries.get(account_id).map(Arc::clone)
    }

    /// Snapshot of every entry.
    pub fn entries(&self) -> Vec<Arc<AccountEntry>> {
        self.inner.read().entries.values().map(Arc::clone).collect()
    }

    /// Defensive copy of the follow-set, in insertion order. The connector
    /// holds this across yield points while adds and removes continue.
    pub fn follow_ids(&self) -> Vec<String> {
        self.inner.read().entries.keys().cloned().collect()
    }

    pub fn needs_restart(&self) -> bool {
        self.restart_on_change && self.inner.read().restart
    }

    pub fn set_restart(&self, restart: bool) {
        if self.restart_on_change {
            self.inner.write().restart = restart;
        }
    }
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
