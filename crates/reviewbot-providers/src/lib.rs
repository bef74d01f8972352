//! # ReviewBot Providers
//!
//! Implementations of `HomeworkApi`: where review statuses come from.

pub mod practicum;

pub use practicum::PracticumClient;
