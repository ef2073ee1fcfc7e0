//! Human-readable progress and problem reporting.
//!
//! Everything goes to stdout as plain text. Problems carry an `ERROR:` or
//! `WARNING:` prefix; lines about a single result file are indented.

use std::fmt::Display;

pub fn info(msg: impl Display) {
    println!("{}", msg);
}

pub fn error(msg: impl Display) {
    println!("ERROR: {}", msg);
}

pub fn file_warn(msg: impl Display) {
    println!("  WARNING: {}", msg);
}

pub fn file_error(msg: impl Display) {
    println!("  ERROR: {}", msg);
}

/// Flatten an error chain into one line (`outer: inner: root`).
pub fn error_message(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
