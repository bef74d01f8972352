//! Response validation — shape checks on the raw API body before use.

use reviewbot_core::error::{Result, ReviewBotError};
use serde_json::Value;

/// Borrowed view of a response that passed `check_response`.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedResponse<'a> {
    pub current_date: &'a Value,
    pub homeworks: &'a [Value],
}

/// Check that `response` is an object with `current_date` and an array
/// `homeworks`. Array elements are not inspected.
pub fn check_response(response: &Value) -> Result<ValidatedResponse<'_>> {
    let Some(map) = response.as_object() else {
        return Err(ReviewBotError::ResponseShape);
    };

    let current_date = map
        .get("current_date")
        .ok_or(ReviewBotError::MissingField("current_date"))?;

    let homeworks = map
        .get("homeworks")
        .ok_or(ReviewBotError::MissingField("homeworks"))?;

    match homeworks.as_array() {
        Some(list) => Ok(ValidatedResponse {
            current_date,
            homeworks: list,
        }),
        None => Err(ReviewBotError::HomeworksType(homeworks.to_string())),
    }
}
