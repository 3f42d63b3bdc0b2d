//! Price Client — a small CLI that talks to the price server: it can trigger a price
//! update (sending the shared secret as a bearer token) or read stored asset collections,
//! and prints the response to stdout (pretty JSON when the body is JSON, raw otherwise).
//!
//! Usage example (CLI):
//! ```bash
//! price_client --server-ip 192.168.0.10 --secret s3cret update
//! price_client get cryptoPrices --id btc
//! ```
#![warn(missing_docs)]
mod args;

use crate::args::{Action, Args};
use asset_common::AssetError;
use asset_common::Result;
use asset_common::net::{ASSETS_PATH, UPDATE_PATH, addr};
use clap::Parser;
use log::{debug, error, info};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, Request};
use std::time::Duration;

fn http_error(e: reqwest::Error) -> AssetError {
    AssetError::Http(e.to_string())
}

/// `http://ip:port`, bracketing bare IPv6 addresses.
fn base_url(ip: &str, port: u16) -> Result<Url> {
    let ip = ip.trim();
    let host = if ip.contains(':') && !ip.starts_with('[') {
        format!("[{}]", ip)
    } else {
        ip.to_string()
    };
    Url::parse(&format!("http://{}", addr(&host, port)))
        .map_err(|e| AssetError::Http(format!("invalid server address {}: {}", host, e)))
}

/// Endpoint for the chosen action. The collection name is pushed as one encoded path
/// segment, so `/`, `?` and `#` in names cannot change the route.
fn request_url(base: &Url, action: &Action) -> Result<Url> {
    let mut url = base.clone();
    match action {
        Action::Update => url.set_path(UPDATE_PATH),
        Action::List => url.set_path(ASSETS_PATH),
        Action::Get { name, id } => {
            url.set_path(ASSETS_PATH);
            url.path_segments_mut()
                .map_err(|_| AssetError::Http(format!("{} cannot carry a path", base)))?
                .push(name);
            if let Some(id) = id {
                url.query_pairs_mut().append_pair("id", id);
            }
        }
    }
    Ok(url)
}

fn build_request(client: &Client, base: &Url, action: &Action, secret: Option<&str>) -> Result<Request> {
    let mut builder = client.get(request_url(base, action)?);
    if let (Action::Update, Some(secret)) = (action, secret) {
        builder = builder.bearer_auth(secret);
    }
    builder.build().map_err(http_error)
}

/// Send `request` and return the status with the raw body text.
fn fetch(client: &Client, request: Request) -> Result<(StatusCode, String)> {
    debug!("Sending {} {}", request.method(), request.url());
    let response = client.execute(request).map_err(http_error)?;
    let status = response.status();
    let body = response.text().map_err(http_error)?;
    Ok((status, body))
}

/// Pretty-print a JSON body; anything else is returned as received.
fn render_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

fn main() -> Result<(), AssetError> {
    init_logger();
    let args = Args::parse();

    let base = base_url(&args.server_ip, args.port)?;
    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .map_err(http_error)?;
    let request = build_request(&client, &base, &args.command, args.secret.as_deref())?;

    info!("Connecting to price server at {}", base);
    let (status, body) = fetch(&client, request)?;
    if !status.is_success() {
        error!("Server answered {}", status);
    }
    println!("{}", render_body(&body));

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}
