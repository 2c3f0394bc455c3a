//! distcache - An in-memory key/value cache server
//!
//! Byte-string keys and values with per-entry TTL expiry, a background reaper
//! that sweeps expired entries, and a small HTTP interface over both.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheStats, CacheStore};
pub use config::Config;
pub use error::{CacheError, Result};
