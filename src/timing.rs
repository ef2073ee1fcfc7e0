//! Start/end timestamps recorded in `exec_info` and the elapsed time between
//! them.
//!
//! Example value: `2024-01-01 00:00:01.500000`. Only the first 26 characters
//! are parsed, so longer fractional parts or trailing text are tolerated. The
//! fractional part itself is mandatory.

use crate::Result;
use anyhow::{Context, anyhow, bail};
use chrono::NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Number of leading characters considered when parsing a timestamp.
pub const TIMESTAMP_WIDTH: usize = 26;

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let head = match s.char_indices().nth(TIMESTAMP_WIDTH) {
        Some((end, _)) => &s[..end],
        None => s,
    };
    // chrono treats `%.f` as optional; whole seconds must not parse.
    if !has_fraction(head) {
        bail!("time data {:?} does not match {}", head, TIMESTAMP_FORMAT);
    }
    NaiveDateTime::parse_from_str(head, TIMESTAMP_FORMAT)
        .with_context(|| format!("time data {:?} does not match {}", head, TIMESTAMP_FORMAT))
}

/// Seconds field followed by `.` and at least one digit.
fn has_fraction(head: &str) -> bool {
    head.rsplit_once(':')
        .and_then(|(_, secs)| secs.split_once('.'))
        .is_some_and(|(_, frac)| frac.starts_with(|c: char| c.is_ascii_digit()))
}

/// Seconds from `start` to `end` (microsecond precision). Negative when `end`
/// precedes `start`.
pub fn elapsed_seconds(start: NaiveDateTime, end: NaiveDateTime) -> Result<f64> {
    let micros = (end - start)
        .num_microseconds()
        .ok_or_else(|| anyhow!("time span from {} to {} is out of range", start, end))?;
    Ok(micros as f64 / 1_000_000.0)
}
