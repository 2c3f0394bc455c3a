//! TTL Parsing
//!
//! Parses duration strings such as `300ms`, `30s`, `1m30s` or `-1.5h` into a
//! signed [`TimeDelta`]. A duration is an optional sign followed by one or more
//! `<number><unit>` groups; numbers may be fractional. Valid units are `ns`,
//! `us` (or `µs`), `ms`, `s`, `m` and `h`. The bare string `0` is also valid.
//!
//! Sign is preserved so that the cache, not the parser, decides whether a
//! negative TTL is acceptable.

use chrono::TimeDelta;

use crate::error::{CacheError, Result};

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this no longer change a nanosecond result.
const MAX_FRACTION_DIGITS: usize = 18;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn leading_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Parses a duration string into a signed TimeDelta.
///
/// # Errors
/// `InvalidArgument` for an empty string, a missing or unknown unit, a group
/// without digits, or a signed total outside the `i64` nanosecond range.
pub fn parse_ttl(input: &str) -> Result<TimeDelta> {
    let invalid = || CacheError::InvalidArgument(format!("Invalid TTL: {input:?}"));

    let (negative, mut rest) = if let Some(tail) = input.strip_prefix('-') {
        (true, tail)
    } else if let Some(tail) = input.strip_prefix('+') {
        (false, tail)
    } else {
        (false, input)
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = leading_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(tail) => leading_digits(tail),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_end);
        let scale = unit_nanos(unit).ok_or_else(invalid)?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            let part = numerator * scale / 10u128.pow(digits.len() as u32);
            nanos = nanos.checked_add(part).ok_or_else(invalid)?;
        }

        total = total.checked_add(nanos).ok_or_else(invalid)?;
        rest = tail;
    }

    // The sign is applied before the range check so that i64::MIN is reachable.
    let magnitude = i128::try_from(total).map_err(|_| invalid())?;
    let signed = if negative { -magnitude } else { magnitude };
    let nanos = i64::try_from(signed).map_err(|_| invalid())?;
    Ok(TimeDelta::nanoseconds(nanos))
}
