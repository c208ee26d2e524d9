// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the tattle daemon.
#[derive(Debug, Clone, clap::Parser)]
pub struct Config {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "TATTLE_HOST")]
    pub host: String,

    /// Port to listen on. Required.
    #[arg(long, env = "TATTLE_PORT")]
    pub port: u16,

    /// Upstream firehose endpoint.
    #[arg(
        long,
        default_value = "https://stream.twitter.com/1.1/statuses/filter.json",
        env = "TATTLE_STREAM_URL"
    )]
    pub stream_url: String,

    /// Restart sweep interval in milliseconds.
    #[arg(long, default_value_t = 15000, env = "TATTLE_SWEEP_MS")]
    pub sweep_ms: u64,

    /// Upstream read-inactivity deadline in seconds; hitting it drops the
    /// stream.
    #[arg(long, default_value_t = 90, env = "TATTLE_READ_TIMEOUT_SECS")]
    pub read_timeout_secs: u64,
}

impl Config {
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sweep_ms)
    }

    pub fn read_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.read_timeout_secs)
    }
}
