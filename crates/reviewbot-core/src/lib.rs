//! # ReviewBot Core
//! Shared error taxonomy, configuration, collaborator traits and data types.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{ReviewBotConfig, Secrets};
pub use error::{Result, ReviewBotError};
pub use traits::{HomeworkApi, Notifier};
pub use types::{PollCursor, SubmissionRecord};
