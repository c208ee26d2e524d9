// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn full_set() -> CredentialSet {
    CredentialSet {
        app_id: "a".to_owned(),
        app_secret: "b".to_owned(),
        api_oauth_token: "c".to_owned(),
        api_oauth_token_secret: "d".to_owned(),
    }
}

#[test]
fn starts_stale() {
    assert!(Credential::new().stale());
}

#[test]
fn update_clears_stale() {
    let credential = Credential::new();
    credential.update(&full_set());
    assert!(!credential.stale());
}

#[test]
fn set_stale_re_arms() {
    let credential = Credential::new();
    credential.update(&full_set());
    credential.set_stale();
    assert!(credential.stale());
    // The tuple itself survives; only the flag flips.
    assert_eq!(credential.snapshot(), full_set());
}

#[yare::parameterized(
    app_id = { "app_id" },
    app_secret = { "app_secret" },
    api_oauth_token = { "api_oauth_token" },
    api_oauth_token_secret = { "api_oauth_token_secret" },
)]
fn valid_requires_every_field(empty: &str) {
    let mut set = full_set();
    match empty {
        "app_id" => set.app_id.clear(),
        "app_secret" => set.app_secret.clear(),
        "api_oauth_token" => set.api_oauth_token.clear(),
        _ => set.api_oauth_token_secret.clear(),
    }
    assert!(!set.valid());
    assert!(full_set().valid());
}

#[test]
fn changed_detects_any_field() {
    let credential = Credential::new();
    credential.update(&full_set());
    assert!(!credential.changed(&full_set()));

    let mut other = full_set();
    other.app_id = "z".to_owned();
    assert!(credential.changed(&other));
}

#[test]
fn snapshot_is_detached() {
    let credential = Credential::new();
    credential.update(&full_set());
    let snapshot = credential.snapshot();

    let mut rotated = full_set();
    rotated.api_oauth_token = "rotated".to_owned();
    credential.update(&rotated);

    assert_eq!(snapshot, full_set());
    assert_eq!(credential.snapshot(), rotated);
}

#[test]
fn missing_json_fields_default_to_empty() -> anyhow::Result<()> {
    let set: CredentialSet = serde_json::from_str(r#"{"app_id":"a"}"#)?;
    assert_eq!(set.app_id, "a");
    assert!(set.app_secret.is_empty());
    assert!(!set.valid());
    Ok(())
}

#[test]
fn json_field_names_are_snake_case() -> anyhow::Result<()> {
    let set: CredentialSet = serde_json::from_str(
        r#"{"app_id":"a","app_secret":"b","api_oauth_token":"c","api_oauth_token_secret":"d"}"#,
    )?;
    assert_eq!(set, full_set());
    Ok(())
}
