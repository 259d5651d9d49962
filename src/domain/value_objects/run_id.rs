//! Run identifier
//!
//! Run ids are UTC timestamps with millisecond precision
//! (`20261016T101530123Z`), so lexicographic order is chronological order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    pub fn from_time(at: DateTime<Utc>) -> Self {
        Self(at.format(FORMAT).to_string())
    }

    pub fn now() -> Self {
        Self::from_time(Utc::now())
    }

    /// The run id one millisecond later, used when two runs start in the same millisecond
    pub fn successor(&self) -> Self {
        match self.timestamp() {
            Some(at) => Self::from_time(at + chrono::Duration::milliseconds(1)),
            None => Self(format!("{}1", self.0)),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.0, FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this run's log inside the ledger directory
    pub fn log_file_name(&self) -> String {
        format!("agent-run-{}.json", self.0)
    }

    /// Parse a run id back out of a run log file name
    pub fn from_log_file_name(name: &str) -> Option<Self> {
        name.strip_prefix("agent-run-")
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|id| id.parse().ok())
    }
}

/// Rejected run id text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRunId(pub String);

impl fmt::Display for InvalidRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid run id '{}'", self.0)
    }
}

impl std::error::Error for InvalidRunId {}

impl FromStr for RunId {
    type Err = InvalidRunId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= 64
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidRunId(s.to_string()))
        }
    }
}

impl TryFrom<String> for RunId {
    type Error = InvalidRunId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
