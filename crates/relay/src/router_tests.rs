// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn entry_with(monitoring: Monitoring, seen: bool, updated: bool) -> Arc<AccountEntry> {
    let store = AccountStore::new(true);
    let entry = store.add("42");
    entry.set_monitoring(monitoring);
    if seen {
        // A scan while monitored marks the scanner as seen.
        entry.set_last_scan();
        assert!(entry.scanner_seen());
    }
    if updated {
        entry.set_last_update();
    }
    entry
}

#[yare::parameterized(
    connector_down = { Lifecycle::Down, Monitoring::Monitored, true, true, Scan::Yes, Reason::MonitoringOff },
    connector_startup = { Lifecycle::Startup, Monitoring::Monitored, true, false, Scan::Yes, Reason::MonitoringOff },
    connector_shutdown = { Lifecycle::Shutdown, Monitoring::Unmonitored, false, true, Scan::Yes, Reason::MonitoringOff },
    not_monitored = { Lifecycle::Up, Monitoring::Unmonitored, false, false, Scan::Yes, Reason::NotMonitored },
    not_monitored_beats_first_scan = { Lifecycle::Up, Monitoring::Unmonitored, false, true, Scan::Yes, Reason::NotMonitored },
    first_scan = { Lifecycle::Up, Monitoring::Monitored, false, false, Scan::Yes, Reason::FirstScan },
    first_scan_beats_updated = { Lifecycle::Up, Monitoring::Monitored, false, true, Scan::Yes, Reason::FirstScan },
    new_content = { Lifecycle::Up, Monitoring::Monitored, true, true, Scan::Yes, Reason::NewContent },
    no_new_content = { Lifecycle::Up, Monitoring::Monitored, true, false, Scan::No, Reason::NoNewContent },
)]
fn decision_table(
    connector: Lifecycle,
    monitoring: Monitoring,
    seen: bool,
    updated: bool,
    scan: Scan,
    reason: Reason,
) {
    let entry = entry_with(monitoring, seen, updated);
    assert_eq!(scan_decision(connector, &entry), (scan, reason));
}

fn body_str(code: u16, scan: Option<Scan>, reason: Reason) -> String {
    String::from_utf8(encode_body(code, scan, reason).to_vec()).unwrap_or_default()
}

#[yare::parameterized(
    created_not_monitored = {
        201, Some(Scan::Yes), Reason::NotMonitored,
        r#"{"Code":201,"Message":"yes","Reason":"not monitored"}"#
    },
    ok_new_content = {
        200, Some(Scan::Yes), Reason::NewContent,
        r#"{"Code":200,"Message":"yes","Reason":"new content has arrived"}"#
    },
    ok_no_new_content = {
        200, Some(Scan::No), Reason::NoNewContent,
        r#"{"Code":200,"Message":"no","Reason":"no new content"}"#
    },
    unauthorized = {
        401, None, Reason::CredentialMismatch,
        r#"{"Code":401,"Reason":"unexpected credential"}"#
    },
    route_down = {
        404, None, Reason::RouteDown,
        r#"{"Code":404,"Reason":"route down"}"#
    },
    not_allowed = {
        405, None, Reason::TryAnotherMethod,
        r#"{"Code":405,"Reason":"try another method"}"#
    },
)]
fn canonical_body_shapes(code: u16, scan: Option<Scan>, reason: Reason, expected: &str) {
    assert_eq!(body_str(code, scan, reason), expected);
}

#[test]
fn canned_table_covers_the_decision_space() {
    let decisions = [
        (Scan::Yes, Reason::NotMonitored),
        (Scan::Yes, Reason::MonitoringOff),
        (Scan::Yes, Reason::FirstScan),
        (Scan::Yes, Reason::NewContent),
        (Scan::No, Reason::NoNewContent),
    ];
    for code in [200, 201] {
        for (scan, reason) in decisions {
            assert!(
                CANNED.contains_key(&(code, Some(scan), reason)),
                "missing canned body for {code} {reason:?}"
            );
        }
    }
}

#[test]
fn router_startup_settles_up() {
    let store = Arc::new(AccountStore::new(true));
    let router =
        Router::new("tw", Arc::clone(&store), Arc::new(Credential::new()), Arc::new(State::new()));
    assert_eq!(router.state().current(), Lifecycle::Down);
    router.state().advance(Lifecycle::Startup);
    assert!(router.startup());
    assert_eq!(router.state().current(), Lifecycle::Up);
}
