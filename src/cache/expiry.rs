//! Expiry Module
//!
//! Converts signed TTLs into absolute deadlines and answers "has this passed?".

use std::time::{Duration, Instant};

use chrono::TimeDelta;

use crate::error::{CacheError, Result};

// == Deadline From TTL ==
/// Resolves a TTL into an absolute expiry instant.
///
/// # Returns
/// - `Err(InvalidArgument)` if `ttl` is negative or cannot be represented
/// - `Ok(None)` if `ttl` is zero (the entry never expires)
/// - `Ok(Some(now + ttl))` otherwise
pub fn expires_at(ttl: TimeDelta, now: Instant) -> Result<Option<Instant>> {
    if ttl < TimeDelta::zero() {
        return Err(CacheError::InvalidArgument(format!(
            "TTL must not be negative, got {}ms",
            ttl.num_milliseconds()
        )));
    }

    if ttl.is_zero() {
        return Ok(None);
    }

    let ttl = ttl
        .to_std()
        .map_err(|_| CacheError::InvalidArgument("TTL is out of range".to_string()))?;

    now.checked_add(ttl)
        .map(Some)
        .ok_or_else(|| CacheError::InvalidArgument("TTL is too large".to_string()))
}

// == Is Expired ==
/// Checks whether a deadline has been reached.
///
/// Boundary condition: a deadline equal to `now` counts as expired, so once the
/// TTL has fully elapsed the entry is gone.
pub fn is_expired(deadline: Instant, now: Instant) -> bool {
    now >= deadline
}

// == Time Remaining ==
/// Returns how long until `deadline`, saturating at zero.
pub fn remaining(deadline: Instant, now: Instant) -> Duration {
    deadline.saturating_duration_since(now)
}
