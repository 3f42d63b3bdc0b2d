//! Command-line arguments for the price client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use asset_common::net::TRIGGER_PORT;
use clap::{Parser, Subcommand};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Server IP address (IPv4 or IPv6) where the price server is running.
    #[clap(long, default_value = "127.0.0.1")]
    pub server_ip: String,

    /// Server trigger port.
    #[clap(long, default_value_t = TRIGGER_PORT)]
    pub port: u16,

    /// Shared secret sent as a bearer token with update triggers.
    #[clap(long, env = "CRON_SECRET")]
    pub secret: Option<String>,

    /// Seconds to wait for the whole exchange; update runs over large stores can be slow.
    #[clap(long, default_value_t = 120)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Action,
}

/// What to ask the server for.
#[derive(Debug, Subcommand)]
pub enum Action {
    /// Trigger a price update now and print the report.
    Update,
    /// Print every stored asset collection.
    List,
    /// Print one collection, or one item of it with `--id`.
    Get {
        /// Collection name, e.g. `cryptoPrices`.
        name: String,
        /// Item id or case-insensitive item name inside an array collection.
        #[clap(long)]
        id: Option<String>,
    },
}
