//! GPU list recorded in a benchmark command line.
//!
//! Grammar: the literal `-gpus=` followed by a comma-separated list of
//! non-negative integers, e.g. `-gpus=0,1,3`. Digits are ASCII `0-9` only;
//! other Unicode decimal digits end the list. Only the first occurrence in the
//! command counts. Runs are grouped by the LAST entry of the list; earlier
//! entries are not validated.

use crate::Result;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpusError {
    #[error("no '-gpus=' pattern in command: {0}")]
    Missing(String),

    #[error("cannot parse GPU count from '{0}'")]
    BadCount(String),
}

/// Grouping key derived from a `-gpus=` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuKey {
    count: u32,
}

impl GpuKey {
    /// Grouping key: the last element of the list.
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Compiled `-gpus=` matcher; build once per scan.
#[derive(Debug, Clone)]
pub struct GpuParser {
    re: Regex,
}

impl GpuParser {
    pub fn new() -> Result<Self> {
        let re = Regex::new(r"-gpus=([0-9,]+)")?;
        Ok(Self { re })
    }

    pub fn find(&self, command: &str) -> std::result::Result<GpuKey, GpusError> {
        let raw = self
            .re
            .captures(command)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| GpusError::Missing(command.to_string()))?;

        // rsplit always yields at least one (possibly empty) token.
        let last = raw.rsplit(',').next().unwrap_or_default();
        let count = last
            .parse::<u32>()
            .map_err(|_| GpusError::BadCount(raw.to_string()))?;

        Ok(GpuKey { count })
    }
}
