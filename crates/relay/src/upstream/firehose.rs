// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-lived streaming connection to the real upstream provider.

use std::io;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::debug;

use super::event::StreamEvent;
use crate::credential::CredentialSet;

type LineStream =
    FramedRead<StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>, LinesCodec>;

/// CRLF-framed JSON event stream over a long-lived authenticated POST.
///
/// TLS (with server-name verification) and gzip decoding come from the HTTP
/// client; lines may be arbitrarily long and empty heartbeat lines are
/// dropped.
pub struct FirehoseTransport {
    url: String,
    read_timeout: Duration,
    client: reqwest::Client,
    lines: Option<LineStream>,
}

impl FirehoseTransport {
    pub fn new(url: String, read_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { url, read_timeout, client, lines: None }
    }

    /// Open the filtered stream. An empty follow-set leaves the transport
    /// down without error.
    pub async fn open(&mut self, creds: &CredentialSet, follow: &[String]) -> anyhow::Result<()> {
        if follow.is_empty() {
            return Ok(());
        }
        // The provider's auth scheme is opaque to the rest of the system;
        // the tuple rides the filter form alongside the follow-set.
        let form = [
            ("follow", follow.join(",")),
            ("app_id", creds.app_id.clone()),
            ("app_secret", creds.app_secret.clone()),
            ("api_oauth_token", creds.api_oauth_token.clone()),
            ("api_oauth_token_secret", creds.api_oauth_token_secret.clone()),
        ];
        let resp = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .context("upstream connect failed")?
            .error_for_status()
            .context("upstream rejected the filter request")?;
        let body = resp.bytes_stream().map_err(io::Error::other).boxed();
        self.lines = Some(FramedRead::new(StreamReader::new(body), LinesCodec::new()));
        Ok(())
    }

    pub fn up(&self) -> bool {
        self.lines.is_some()
    }

    /// Read the next decodable event. Per-event decode failures are skipped;
    /// inactivity past the read deadline, EOF, and framing errors tear the
    /// session down.
    pub async fn next(&mut self) -> anyhow::Result<Option<StreamEvent>> {
        loop {
            let Some(lines) = self.lines.as_mut() else {
                return Ok(None);
            };
            match tokio::time::timeout(self.read_timeout, lines.next()).await {
                Err(_) => {
                    self.lines = None;
                    anyhow::bail!("no data for {:?}, dropping the stream", self.read_timeout);
                }
                Ok(None) => {
                    self.lines = None;
                    anyhow::bail!("upstream closed the stream");
                }
                Ok(Some(Err(e))) => {
                    self.lines = None;
                    return Err(anyhow::Error::new(e).context("stream read failed"));
                }
                Ok(Some(Ok(line))) => {
                    if line.is_empty() {
                        continue; // heartbeat
                    }
                    match StreamEvent::decode(&line) {
                        Ok(event) => return Ok(Some(event)),
                        Err(e) => debug!(err = %e, "skipping undecodable event"),
                    }
                }
            }
        }
    }

    pub fn close(&mut self) {
        self.lines = None;
    }
}
