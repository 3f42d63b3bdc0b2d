//! Command-line arguments for the price server.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use asset_common::net::TRIGGER_PORT;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::listener::ServerLimits;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file holding the stored asset records.
    #[clap(long, env = "ASSET_STORE")]
    pub store: PathBuf,

    /// Local address to bind the trigger endpoint on.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind_ip: String,

    /// TCP port for the trigger and asset endpoints.
    #[clap(long, default_value_t = TRIGGER_PORT)]
    pub port: u16,

    /// Shared secret expected as `Authorization: Bearer <secret>` on update triggers.
    /// When unset, triggers are accepted without a check.
    #[clap(long, env = "CRON_SECRET")]
    pub cron_secret: Option<String>,

    /// Seconds a client gets to send a complete request head.
    #[clap(long, default_value_t = 10)]
    pub header_timeout_secs: u64,

    /// Seconds after which any connection is dropped.
    #[clap(long, default_value_t = 60)]
    pub connection_timeout_secs: u64,

    /// Largest accepted request head in bytes (at least 8192).
    #[clap(long, default_value_t = 16 * 1024)]
    pub max_header_bytes: usize,

    /// Run a price update every N seconds. 0 only updates on demand.
    #[clap(long, default_value_t = 0)]
    pub interval_secs: u64,

    /// Seed for reproducible price paths.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Run a single update, print the report, and exit.
    #[clap(long)]
    pub once: bool,
}

impl Args {
    /// Connection limits for the HTTP listener.
    pub fn limits(&self) -> ServerLimits {
        ServerLimits {
            header_read_timeout: Duration::from_secs(self.header_timeout_secs),
            connection_timeout: Duration::from_secs(self.connection_timeout_secs),
            max_buf_size: self.max_header_bytes,
            ..ServerLimits::default()
        }
    }
}
