// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-format decoding for upstream activity events.

use serde::Deserialize;

/// A decoded activity event. `scan_user_id` names the account the event is
/// about; `retweet_of_user_id` and `mentions` classify events that arrive
/// for accounts outside the follow-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub scan_user_id: Option<String>,
    pub retweet_of_user_id: Option<String>,
    pub mentions: Vec<String>,
}

#[derive(Deserialize)]
struct WireEvent {
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    in_reply_to_user_id_str: Option<String>,
    #[serde(default)]
    retweeted_status: Option<WireRetweet>,
    #[serde(default)]
    entities: Option<WireEntities>,
}

#[derive(Deserialize)]
struct WireUser {
    #[serde(default)]
    id_str: Option<String>,
}

#[derive(Deserialize)]
struct WireRetweet {
    #[serde(default)]
    user: Option<WireUser>,
}

#[derive(Deserialize)]
struct WireEntities {
    #[serde(default)]
    user_mentions: Vec<WireUser>,
}

impl StreamEvent {
    /// Decode one line of the stream. A reply scans the replied-to account,
    /// anything else scans the author; retweet and mention ids ride along
    /// for classification.
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        let wire: WireEvent = serde_json::from_str(line)?;
        let author = wire.user.and_then(|u| u.id_str);
        let scan_user_id = wire.in_reply_to_user_id_str.or(author);
        let retweet_of_user_id = wire.retweeted_status.and_then(|r| r.user).and_then(|u| u.id_str);
        let mentions = wire
            .entities
            .map(|e| e.user_mentions.into_iter().filter_map(|u| u.id_str).collect())
            .unwrap_or_default();
        Ok(Self { scan_user_id, retweet_of_user_id, mentions })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
