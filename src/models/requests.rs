//! Request DTOs for the cache server API
//!
//! Every endpoint addresses a key through the `key` query parameter; `/set`
//! additionally takes an optional `ttl` duration string.
//!
//! Parameters are decoded from the raw query string rather than through serde,
//! so a percent-encoded key keeps its exact bytes even when they are not valid
//! UTF-8. When a parameter is repeated, the first occurrence wins.

use chrono::TimeDelta;
use percent_encoding::percent_decode;

use crate::error::{CacheError, Result};
use crate::models::ttl::parse_ttl;

/// Query parameters for `/get`, `/has` and `/delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyQuery {
    /// The cache key, percent-decoded to raw bytes
    pub key: Option<Vec<u8>>,
}

impl KeyQuery {
    /// Decodes the parameters from a raw query string.
    pub fn from_raw(query: Option<&str>) -> Self {
        Self {
            key: query.and_then(|q| query_param(q, "key")),
        }
    }

    /// Returns the key, rejecting a missing or empty one.
    pub fn require_key(&self) -> Result<&[u8]> {
        require_key(self.key.as_deref())
    }
}

/// Query parameters for `POST /set`; the value travels in the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetQuery {
    /// The cache key, percent-decoded to raw bytes
    pub key: Option<Vec<u8>>,
    /// Duration string such as `30s` or `1m30s`; absent or empty means no expiry
    pub ttl: Option<Vec<u8>>,
}

impl SetQuery {
    /// Decodes the parameters from a raw query string.
    pub fn from_raw(query: Option<&str>) -> Self {
        Self {
            key: query.and_then(|q| query_param(q, "key")),
            ttl: query.and_then(|q| query_param(q, "ttl")),
        }
    }

    /// Returns the key, rejecting a missing or empty one.
    pub fn require_key(&self) -> Result<&[u8]> {
        require_key(self.key.as_deref())
    }

    /// Parses the TTL parameter.
    pub fn ttl(&self) -> Result<TimeDelta> {
        match self.ttl.as_deref() {
            None | Some(b"") => Ok(TimeDelta::zero()),
            Some(raw) => {
                let raw = std::str::from_utf8(raw).map_err(|_| {
                    CacheError::InvalidArgument("Invalid TTL: not valid UTF-8".to_string())
                })?;
                parse_ttl(raw)
            }
        }
    }
}

fn require_key(key: Option<&[u8]>) -> Result<&[u8]> {
    key.filter(|k| !k.is_empty())
        .ok_or_else(|| CacheError::InvalidArgument("Invalid Key".to_string()))
}

/// Returns the decoded value of the first `name=value` pair named `name`.
fn query_param(query: &str, name: &str) -> Option<Vec<u8>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(raw_name) == name.as_bytes()).then(|| decode_component(raw_value))
        })
}

/// Form-style decoding: `+` is a space, `%XX` is the byte `XX`.
fn decode_component(raw: &str) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .bytes()
        .map(|b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}
