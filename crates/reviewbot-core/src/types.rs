//! Shared data types.

use serde_json::Value;
use std::fmt;

use crate::error::{Result, ReviewBotError};

/// Opaque watermark bounding the next fetch (`from_date`).
///
/// Taken verbatim from the API's `current_date`; never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCursor(String);

impl PollCursor {
    /// Cursor at the current Unix time, used before the first poll.
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp().to_string())
    }

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build a cursor from a `current_date` value. Strings are taken as-is,
    /// anything else by its JSON rendering.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self(s.clone()),
            other => Self(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PollCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The most recently updated homework submission in a response.
///
/// `status` is `None` when the key is absent or null. A non-string status is
/// kept in its JSON rendering so it fails verdict lookup instead of passing as
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub name: String,
    pub status: Option<String>,
}

impl SubmissionRecord {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Some(status.into()),
        }
    }

    /// Extract from one element of the `homeworks` array. Fails when the
    /// element is not an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(ReviewBotError::HomeworkRecord(value.to_string()));
        };

        let name = map
            .get("homework_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let status = match map.get("status") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Ok(Self { name, status })
    }
}
