//! # ReviewBot Scheduler
//!
//! The polling loop that watches one homework's review status.
//!
//! ## Architecture
//! ```text
//! PollLoop (fixed retry period)
//!   ├── HomeworkApi::fetch(from_date = cursor)
//!   ├── check_response → current_date + homeworks[]
//!   ├── homeworks[0].status != last_status?
//!   │     └── parse_status → Notifier::send
//!   ├── advance cursor to current_date
//!   └── on error → ErrorAlertGate → one alert per failure run
//! ```

pub mod alert;
pub mod engine;
pub mod validate;
pub mod verdict;

pub use alert::ErrorAlertGate;
pub use engine::{PollLoop, PollState, TickOutcome};
pub use validate::{ValidatedResponse, check_response};
pub use verdict::{ReviewStatus, parse_status};
