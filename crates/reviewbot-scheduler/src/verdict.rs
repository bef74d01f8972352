//! Status translation — maps a submission's review status to the message text.

use std::fmt;
use std::str::FromStr;

use reviewbot_core::error::{Result, ReviewBotError};
use reviewbot_core::types::SubmissionRecord;

/// Known review statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub fn key(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = ReviewBotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approved" => Ok(Self::Approved),
            "reviewing" => Ok(Self::Reviewing),
            "rejected" => Ok(Self::Rejected),
            other => Err(ReviewBotError::UnknownVerdict(other.to_string())),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Build the status-change message for a submission.
pub fn parse_status(record: &SubmissionRecord) -> Result<String> {
    if record.name.is_empty() {
        return Err(ReviewBotError::MissingField("homework_name"));
    }
    let status: ReviewStatus = match record.status.as_deref() {
        None | Some("") => return Err(ReviewBotError::MissingField("status")),
        Some(key) => key.parse()?,
    };

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        record.name,
        status.verdict()
    ))
}
