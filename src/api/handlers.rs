//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Handlers own no state
//! beyond the shared cache handle.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{RawQuery, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{HealthResponse, KeyQuery, SetQuery, StatsResponse};

/// Default cap on `/set` request bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024; // 1 MB

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<CacheStore>,
    /// Largest accepted `/set` body, in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(cache),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The reaper is not started here; see [`CacheStore::start_cleanup`].
    pub fn from_config(config: &Config) -> Self {
        let cache = CacheStore::new(config.cleanup_interval());
        Self {
            cache: Arc::new(cache),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Handler for GET /get?key=K
///
/// Responds with the raw stored bytes.
pub async fn get_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Bytes> {
    let query = KeyQuery::from_raw(query.as_deref());
    let key = query.require_key()?;
    debug!(key = %String::from_utf8_lossy(key), "Received GET request");

    state.cache.get(key)
}

/// Handler for POST /set?key=K&ttl=D
///
/// Stores the request body under `key`. A missing `ttl` stores without expiry.
pub async fn set_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Body,
) -> Result<StatusCode> {
    let query = SetQuery::from_raw(query.as_deref());
    let key = query.require_key()?.to_vec();
    let ttl = query.ttl()?;

    let value = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|err| CacheError::Internal(format!("Failed to read body: {err}")))?;

    debug!(
        key = %String::from_utf8_lossy(&key),
        bytes = value.len(),
        ttl_ms = ttl.num_milliseconds(),
        "Received SET request"
    );
    state.cache.set(key, value, ttl)?;

    Ok(StatusCode::OK)
}

/// Handler for GET /has?key=K
///
/// Responds `200 true` when the key is live, `404 false` otherwise.
pub async fn has_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<(StatusCode, &'static str)> {
    let query = KeyQuery::from_raw(query.as_deref());
    let key = query.require_key()?;
    debug!(key = %String::from_utf8_lossy(key), "Received HAS request");

    if state.cache.has(key) {
        Ok((StatusCode::OK, "true"))
    } else {
        Ok((StatusCode::NOT_FOUND, "false"))
    }
}

/// Handler for DELETE /delete?key=K
///
/// Deleting a key that is not held still answers 200.
pub async fn delete_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<StatusCode> {
    let query = KeyQuery::from_raw(query.as_deref());
    let key = query.require_key()?;
    debug!(key = %String::from_utf8_lossy(key), "Received DELETE request");

    match state.cache.delete(key) {
        Ok(()) => Ok(StatusCode::OK),
        Err(CacheError::NotFound(_)) => {
            debug!(key = %String::from_utf8_lossy(key), "DELETE for absent key");
            Ok(StatusCode::OK)
        }
        Err(err) => Err(err),
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.is_cleanup_running()))
}
