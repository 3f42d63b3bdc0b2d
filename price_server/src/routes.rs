//! HTTP routes for the trigger and asset read endpoints.
//!
//! Routes:
//! - `GET /api/cron/updatePrices` — run a price update (bearer secret required when set).
//! - `GET /api/assets` — every stored record, newest first.
//! - `GET /api/assets/{name}[?id=X]` — one record, or one item of its array `data`.
//!
//! Handlers never touch the store themselves; every request becomes a `Job` for the
//! update worker, awaited off the async threads through `spawn_blocking`.

use std::cmp::Reverse;
use std::sync::Arc;

use asset_common::net::{ASSETS_PATH, UPDATE_PATH};
use asset_common::report::ErrorBody;
use asset_common::{AssetError, Result, StoredAsset};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, FixedOffset};
use crossbeam_channel::{Sender, unbounded};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use tokio::task;

use crate::worker::Job;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    secret: Option<Arc<str>>,
    jobs: Sender<Job>,
}

impl AppState {
    /// Handlers authorize updates against `secret` (when set) and talk to the worker through `jobs`.
    pub fn new(secret: Option<String>, jobs: Sender<Job>) -> Self {
        Self {
            secret: secret.map(Arc::from),
            jobs,
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };
        let expected = format!("Bearer {}", secret);
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

/// Query string of the single-asset endpoint.
#[derive(Debug, Deserialize)]
struct AssetQuery {
    id: Option<String>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(UPDATE_PATH, get(update_prices))
        .route(ASSETS_PATH, get(list_assets))
        .route(&format!("{}/{{name}}", ASSETS_PATH), get(get_asset))
        .fallback(not_found)
        .with_state(state)
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(error))).into_response()
}

/// Send a job built around a fresh reply channel and wait for the answer.
async fn ask<T, F>(jobs: Sender<Job>, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(Sender<Result<T>>) -> Job + Send + 'static,
{
    let handle = task::spawn_blocking(move || {
        let (reply_tx, reply_rx) = unbounded();
        jobs.send(job(reply_tx))
            .map_err(|e| AssetError::ChannelSend(e.to_string()))?;
        reply_rx
            .recv()
            .map_err(|e| AssetError::ChannelRecv(e.to_string()))?
    });
    handle
        .await
        .map_err(|e| AssetError::ChannelRecv(e.to_string()))?
}

async fn update_prices(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        warn!("Rejected price update trigger: bad or missing authorization");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized access");
    }
    match ask(state.jobs, |reply| Job::RunUpdate { reply: Some(reply) }).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn list_assets(State(state): State<AppState>) -> Response {
    match ask(state.jobs, |reply| Job::ListAssets { reply }).await {
        Ok(mut assets) => {
            newest_first(&mut assets);
            (StatusCode::OK, Json(assets)).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn get_asset(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<AssetQuery>,
) -> Response {
    let wanted = name.clone();
    let asset = match ask(state.jobs, move |reply| Job::GetAsset { name: wanted, reply }).await {
        Ok(asset) => asset,
        Err(e @ AssetError::NotFound(_)) => return error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    match (query.id, &asset.data) {
        (Some(filter), Value::Array(items)) => match find_item(items, &filter) {
            Some(item) => (StatusCode::OK, Json(item.clone())).into_response(),
            None => error_response(
                StatusCode::NOT_FOUND,
                format!("Item with id/name '{}' not found in {}", filter, name),
            ),
        },
        _ => (StatusCode::OK, Json(asset)).into_response(),
    }
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn created_at(asset: &StoredAsset) -> Option<DateTime<FixedOffset>> {
    asset
        .created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Sort by creation instant, newest first. Missing or unparseable timestamps sort last.
fn newest_first(assets: &mut [StoredAsset]) {
    assets.sort_by_cached_key(|a| Reverse(created_at(a)));
}

/// First item whose `id` equals `filter` or whose `name` matches it case-insensitively.
fn find_item<'a>(items: &'a [Value], filter: &str) -> Option<&'a Value> {
    let wanted = filter.to_lowercase();
    items.iter().find(|item| {
        item.get("id").and_then(Value::as_str) == Some(filter)
            || item
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.to_lowercase() == wanted)
    })
}
