use crate::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Typed view over the `exec_info` properties of one execution. Properties
/// other than these three are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecInfo {
    #[serde(rename = "Command", default)]
    pub command: Option<String>,

    #[serde(rename = "Start Time", default)]
    pub start_time: Option<String>,

    #[serde(rename = "End Time", default)]
    pub end_time: Option<String>,
}

/// The properties every usable execution must carry, all non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFields<'a> {
    pub command: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing or empty: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl ExecInfo {
    pub fn from_properties(props: BTreeMap<String, String>) -> Result<Self> {
        let value = serde_json::to_value(props)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn required(&self) -> std::result::Result<RequiredFields<'_>, MissingFields> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }

        let command = non_empty(&self.command);
        let start_time = non_empty(&self.start_time);
        let end_time = non_empty(&self.end_time);

        match (command, start_time, end_time) {
            (Some(command), Some(start_time), Some(end_time)) => Ok(RequiredFields {
                command,
                start_time,
                end_time,
            }),
            _ => {
                let mut missing = Vec::new();
                if command.is_none() {
                    missing.push("Command");
                }
                if start_time.is_none() {
                    missing.push("Start Time");
                }
                if end_time.is_none() {
                    missing.push("End Time");
                }
                Err(MissingFields(missing))
            }
        }
    }
}
