//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.
//! A `.env` file, if present, is loaded into the environment by `main` first.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::api::DEFAULT_MAX_BODY_BYTES;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interval between TTL sweeps, in milliseconds
    pub cleanup_interval_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Largest accepted `/set` body, in bytes
    pub max_body_bytes: usize,
    /// How long shutdown waits for the reaper to finish, in seconds
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CLEANUP_TICK` - Sweep interval in milliseconds (default: 5000)
    /// - `PORT` - HTTP server port, optionally written as `:PORT` (default: 42069)
    /// - `MAX_BODY_BYTES` - Maximum `/set` body size (default: 1 MiB)
    /// - `SHUTDOWN_TIMEOUT_SECS` - Reaper shutdown wait (default: 5)
    ///
    /// # Errors
    /// Fails if a variable is set but cannot be parsed, or if the sweep
    /// interval is zero.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let cleanup_interval_ms =
            parse_var(&lookup, "CACHE_CLEANUP_TICK", defaults.cleanup_interval_ms)?;
        if cleanup_interval_ms == 0 {
            bail!("CACHE_CLEANUP_TICK must be greater than 0");
        }

        let server_port = match lookup("PORT") {
            Some(raw) => {
                let port = raw.trim();
                let port = port.strip_prefix(':').unwrap_or(port);
                port.parse::<u16>()
                    .with_context(|| format!("invalid PORT: {raw:?}"))?
            }
            None => defaults.server_port,
        };

        Ok(Self {
            cleanup_interval_ms,
            server_port,
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
            shutdown_timeout_secs: parse_var(
                &lookup,
                "SHUTDOWN_TIMEOUT_SECS",
                defaults.shutdown_timeout_secs,
            )?,
        })
    }

    /// Returns the sweep interval as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Returns the reaper shutdown wait as a Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {name}: {raw:?}")),
        None => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cleanup_interval_ms: 5000,
            server_port: 42069,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            shutdown_timeout_secs: 5,
        }
    }
}
