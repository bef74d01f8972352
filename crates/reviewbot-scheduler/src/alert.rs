//! Error-alert deduplication.
//!
//! At most one alert per unbroken run of failed iterations. A failed alert
//! delivery leaves the gate open so the next failure retries it.

/// Tracks whether the current failure run has already been reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorAlertGate {
    notified: bool,
}

impl ErrorAlertGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when an alert for the current failure run should be attempted.
    pub fn should_alert(&self) -> bool {
        !self.notified
    }

    /// Record a delivered alert; suppresses further alerts until `reset`.
    pub fn mark_sent(&mut self) {
        self.notified = true;
    }

    /// A clean iteration ends the failure run.
    pub fn reset(&mut self) {
        self.notified = false;
    }

    pub fn is_notified(&self) -> bool {
        self.notified
    }
}

/// Text of the alert sent for a failed iteration.
pub fn error_message(error: &impl std::fmt::Display) -> String {
    format!("Сбой в работе программы: {error}")
}
