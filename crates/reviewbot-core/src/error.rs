//! Error taxonomy for ReviewBot.
//!
//! Display texts double as the user-facing part of the error alert
//! (`Сбой в работе программы: <text>`), so they are written in Russian.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ReviewBotError>;

#[derive(Debug, Error)]
pub enum ReviewBotError {
    /// Transport failure, non-2xx status or undecodable body.
    #[error("{0}")]
    Fetch(String),

    /// Top-level response value is not a JSON object.
    #[error("Некорректный тип ответа. Ожидается словарь.")]
    ResponseShape,

    #[error("В ответе отсутствует ключ \"{0}\"")]
    MissingField(&'static str),

    /// `homeworks` is present but is not an array. Holds the offending value.
    #[error("Некорректный тип перечня работ \"{0}\"")]
    HomeworksType(String),

    /// An element of `homeworks` is not an object. Holds the offending value.
    #[error("Некорректный тип записи о работе \"{0}\"")]
    HomeworkRecord(String),

    #[error("Неизвестное значение статуса (вердикт): \"{0}\"")]
    UnknownVerdict(String),

    #[error("Ошибка отправки сообщения: {0}")]
    Notification(String),

    /// A required secret is missing from the environment. Fatal at startup.
    #[error("Отсутствует обязательная переменная окружения {0}")]
    Token(&'static str),

    #[error("Ошибка конфигурации: {0}")]
    Config(String),
}

impl ReviewBotError {
    /// Fetch error for a non-2xx HTTP status.
    pub fn http_status(code: u16) -> Self {
        Self::Fetch(format!("Ошибка запроса со статусом {code}"))
    }

    /// Fetch error for a connection-level failure.
    pub fn transport(detail: impl std::fmt::Display) -> Self {
        Self::Fetch(format!("Ошибка эндпоинта {detail}"))
    }

    /// Fetch error for a body that is not valid JSON.
    pub fn bad_json(detail: impl std::fmt::Display) -> Self {
        Self::Fetch(format!("Некорректный JSON в ответе: {detail}"))
    }

    /// Short machine-friendly kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::ResponseShape => "response_shape",
            Self::MissingField(_) => "missing_field",
            Self::HomeworksType(_) => "homeworks_type",
            Self::HomeworkRecord(_) => "homework_record",
            Self::UnknownVerdict(_) => "unknown_verdict",
            Self::Notification(_) => "notification",
            Self::Token(_) => "token",
            Self::Config(_) => "config",
        }
    }
}
