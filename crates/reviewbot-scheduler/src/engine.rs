//! Poll loop — fetch, validate, detect a status change, notify, sleep.
//!
//! Strictly sequential: one iteration (including its sleep) finishes before
//! the next starts, so the loop state needs no synchronization.

use std::time::Duration;

use reviewbot_core::error::{Result, ReviewBotError};
use reviewbot_core::traits::{HomeworkApi, Notifier};
use reviewbot_core::types::{PollCursor, SubmissionRecord};

use crate::alert::{ErrorAlertGate, error_message};
use crate::validate::check_response;
use crate::verdict::parse_status;

/// Loop-owned state carried across iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    /// Lower bound (`from_date`) for the next fetch.
    pub cursor: PollCursor,
    /// Status from the last successfully notified submission. `None` until
    /// the first notification, so the first observed status is always reported.
    pub last_status: Option<String>,
    pub alerts: ErrorAlertGate,
}

impl PollState {
    pub fn new(cursor: PollCursor) -> Self {
        Self {
            cursor,
            last_status: None,
            alerts: ErrorAlertGate::new(),
        }
    }
}

/// What one iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Status changed and the message was delivered.
    Notified { status: String },
    /// Latest submission still has the last reported status.
    Unchanged { status: String },
    /// Response carried no submissions.
    NoHomeworks,
    /// The iteration hit an error. `alerted` is true if an alert went out.
    Failed { error: String, alerted: bool },
}

/// The polling engine.
pub struct PollLoop<A, N> {
    api: A,
    notifier: N,
    chat_id: String,
    retry_period: Duration,
    state: PollState,
}

impl<A: HomeworkApi, N: Notifier> PollLoop<A, N> {
    /// Create a loop whose first fetch starts from the current time.
    pub fn new(api: A, notifier: N, chat_id: impl Into<String>, retry_period: Duration) -> Self {
        Self {
            api,
            notifier,
            chat_id: chat_id.into(),
            retry_period,
            state: PollState::new(PollCursor::now()),
        }
    }

    /// Replace the initial state.
    pub fn with_state(mut self, state: PollState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run forever: one `tick`, then a flat sleep, including after errors.
    pub async fn run(mut self) {
        tracing::info!(
            "⏰ Polling started (every {}s, notifier: {})",
            self.retry_period.as_secs(),
            self.notifier.name()
        );

        loop {
            match self.tick().await {
                TickOutcome::Notified { status } => {
                    tracing::info!("📣 Status change reported: {status}");
                }
                TickOutcome::Unchanged { status } => {
                    tracing::debug!("Status unchanged: {status}");
                }
                TickOutcome::NoHomeworks => {
                    tracing::debug!("No homework updates since last poll");
                }
                TickOutcome::Failed { error, alerted } => {
                    tracing::debug!("Iteration failed (alerted: {alerted}): {error}");
                }
            }

            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// One iteration without the sleep. Never fails: errors go through the
    /// alert path and come back as `TickOutcome::Failed`.
    pub async fn tick(&mut self) -> TickOutcome {
        match self.poll_once().await {
            Ok(outcome) => {
                self.state.alerts.reset();
                outcome
            }
            Err(e) => self.handle_error(e).await,
        }
    }

    async fn poll_once(&mut self) -> Result<TickOutcome> {
        let response = self.api.fetch(&self.state.cursor).await?;
        let validated = check_response(&response)?;

        let next_cursor = PollCursor::from_value(validated.current_date);
        // Only the first element is current; the rest are ignored.
        let latest = validated
            .homeworks
            .first()
            .map(SubmissionRecord::from_value)
            .transpose();

        let outcome = match latest {
            Ok(latest) => self.report_change(latest).await,
            Err(e) => Err(e),
        };
        // The response was well-formed, so the window is consumed even if
        // translation or delivery failed.
        self.state.cursor = next_cursor;
        outcome
    }

    async fn report_change(&mut self, latest: Option<SubmissionRecord>) -> Result<TickOutcome> {
        let Some(record) = latest else {
            return Ok(TickOutcome::NoHomeworks);
        };

        if let Some(status) = &record.status
            && self.state.last_status.as_ref() == Some(status)
        {
            return Ok(TickOutcome::Unchanged {
                status: status.clone(),
            });
        }

        let message = parse_status(&record)?;
        self.notifier.send(&self.chat_id, &message).await?;
        tracing::info!("✉️ Notification sent: \"{message}\"");

        let status = record.status.unwrap_or_default();
        self.state.last_status = Some(status.clone());
        Ok(TickOutcome::Notified { status })
    }

    async fn handle_error(&mut self, error: ReviewBotError) -> TickOutcome {
        tracing::error!(kind = error.kind(), "❌ Ошибка: {error}");

        if !self.state.alerts.should_alert() {
            tracing::debug!("🔕 Error alert suppressed, already reported for this failure run");
            return TickOutcome::Failed {
                error: error.to_string(),
                alerted: false,
            };
        }

        let alerted = match self.notifier.send(&self.chat_id, &error_message(&error)).await {
            Ok(()) => {
                self.state.alerts.mark_sent();
                true
            }
            Err(send_err) => {
                tracing::error!("⚠️ Failed to deliver error alert: {send_err}");
                false
            }
        };

        TickOutcome::Failed {
            error: error.to_string(),
            alerted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays scripted responses, then answers with an empty homework list.
    #[derive(Default)]
    struct ScriptedApi {
        script: Mutex<VecDeque<Result<Value>>>,
        cursors: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn new(script: Vec<Result<Value>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                cursors: Mutex::default(),
            }
        }

        fn cursors(&self) -> Vec<String> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HomeworkApi for ScriptedApi {
        async fn fetch(&self, from: &PollCursor) -> Result<Value> {
            self.cursors.lock().unwrap().push(from.to_string());
            let mut script = self.script.lock().unwrap();
            match script.pop_front() {
                Some(next) => next,
                None => Ok(json!({"current_date": 0, "homeworks": []})),
            }
        }
    }

    /// Records delivered messages; fails while `failing` is set.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        failing: Mutex<bool>,
    }

    impl RecordingNotifier {
        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, destination: &str, text: &str) -> Result<()> {
            if *self.failing.lock().unwrap() {
                return Err(ReviewBotError::Notification("chat unreachable".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn homework(date: i64, name: &str, status: &str) -> Result<Value> {
        Ok(json!({
            "current_date": date,
            "homeworks": [{"homework_name": name, "status": status}],
        }))
    }

    fn make_loop(
        script: Vec<Result<Value>>,
    ) -> PollLoop<Arc<ScriptedApi>, Arc<RecordingNotifier>> {
        PollLoop::new(
            Arc::new(ScriptedApi::new(script)),
            Arc::new(RecordingNotifier::default()),
            "42",
            Duration::from_secs(600),
        )
        .with_state(PollState::new(PollCursor::new("1")))
    }

    fn connection_error() -> Result<Value> {
        Err(ReviewBotError::transport("connection refused"))
    }

    #[tokio::test]
    async fn test_first_status_is_notified() {
        let mut poll = make_loop(vec![homework(100, "hw1", "reviewing")]);

        let outcome = poll.tick().await;

        assert_eq!(outcome, TickOutcome::Notified { status: "reviewing".into() });
        assert_eq!(
            poll.notifier().texts(),
            vec!["Изменился статус проверки работы \"hw1\". Работа взята на проверку ревьюером."]
        );
        assert_eq!(poll.notifier().sent.lock().unwrap()[0].0, "42");
        assert_eq!(poll.state().last_status.as_deref(), Some("reviewing"));
        assert_eq!(poll.state().cursor.as_str(), "100");
    }

    #[tokio::test]
    async fn test_unchanged_status_is_silent() {
        let mut poll = make_loop(vec![homework(100, "hw1", "approved")]);
        poll.state.last_status = Some("approved".into());

        let outcome = poll.tick().await;

        assert_eq!(outcome, TickOutcome::Unchanged { status: "approved".into() });
        assert!(poll.notifier().texts().is_empty());
        assert_eq!(poll.state().last_status.as_deref(), Some("approved"));
    }

    #[tokio::test]
    async fn test_empty_homeworks_advances_cursor_only() {
        let mut poll = make_loop(vec![Ok(json!({"current_date": 100, "homeworks": []}))]);
        poll.state.last_status = Some("reviewing".into());

        let outcome = poll.tick().await;

        assert_eq!(outcome, TickOutcome::NoHomeworks);
        assert!(poll.notifier().texts().is_empty());
        assert_eq!(poll.state().last_status.as_deref(), Some("reviewing"));
        assert_eq!(poll.state().cursor.as_str(), "100");
    }

    #[tokio::test]
    async fn test_only_first_homework_counts() {
        let mut poll = make_loop(vec![Ok(json!({
            "current_date": 5,
            "homeworks": [
                {"homework_name": "hw2", "status": "rejected"},
                {"homework_name": "hw1", "status": "approved"},
            ],
        }))]);

        poll.tick().await;

        assert_eq!(poll.state().last_status.as_deref(), Some("rejected"));
        assert_eq!(poll.notifier().texts().len(), 1);
    }

    #[tokio::test]
    async fn test_cursor_is_sent_and_advanced() {
        let mut poll = make_loop(vec![
            Ok(json!({"current_date": 100, "homeworks": []})),
            Ok(json!({"current_date": 200, "homeworks": []})),
        ]);

        poll.tick().await;
        poll.tick().await;

        assert_eq!(poll.api().cursors(), vec!["1", "100"]);
        assert_eq!(poll.state().cursor.as_str(), "200");
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_cursor() {
        let malformed = [
            json!({"homeworks": []}),
            json!({"current_date": 100}),
            json!({"current_date": 100, "homeworks": "none"}),
            json!(["not", "a", "map"]),
        ];

        for response in malformed {
            let mut poll = make_loop(vec![Ok(response)]);
            let outcome = poll.tick().await;
            assert!(matches!(outcome, TickOutcome::Failed { alerted: true, .. }));
            assert_eq!(poll.state().cursor.as_str(), "1");
            assert_eq!(poll.notifier().texts().len(), 1);
            assert!(poll.notifier().texts()[0].starts_with("Сбой в работе программы: "));
        }
    }

    #[tokio::test]
    async fn test_unknown_status_advances_cursor_without_notifying_status() {
        let mut poll = make_loop(vec![homework(100, "hw1", "lost")]);

        let outcome = poll.tick().await;

        let TickOutcome::Failed { error, alerted } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(alerted);
        assert!(error.contains("lost"));
        assert_eq!(poll.state().cursor.as_str(), "100");
        assert_eq!(poll.state().last_status, None);
        let texts = poll.notifier().texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("Сбой в работе программы: Неизвестное значение статуса"));
    }

    #[tokio::test]
    async fn test_malformed_record_is_an_error() {
        let records = [
            (json!({"homework_name": "hw1"}), "В ответе отсутствует ключ \"status\""),
            (json!({"homework_name": "hw1", "status": ""}), "В ответе отсутствует ключ \"status\""),
            (json!({"homework_name": "hw1", "status": 3}), "Неизвестное значение статуса"),
            (json!(5), "Некорректный тип записи о работе"),
        ];

        for (record, expected) in records {
            let mut poll = make_loop(vec![Ok(json!({"current_date": 100, "homeworks": [record]}))]);

            let outcome = poll.tick().await;

            let TickOutcome::Failed { error, alerted } = outcome else {
                panic!("expected failure, got {outcome:?}");
            };
            assert!(alerted);
            assert!(error.starts_with(expected), "{error}");
            assert_eq!(poll.state().cursor.as_str(), "100");
            assert_eq!(poll.state().last_status, None);
            assert!(poll.state().alerts.is_notified());
        }
    }

    #[tokio::test]
    async fn test_malformed_record_keeps_failure_run_suppressed() {
        let mut poll = make_loop(vec![
            connection_error(),
            Ok(json!({"current_date": 100, "homeworks": [{"homework_name": "hw1"}]})),
        ]);

        let first = poll.tick().await;
        let second = poll.tick().await;

        assert!(matches!(first, TickOutcome::Failed { alerted: true, .. }));
        assert!(matches!(second, TickOutcome::Failed { alerted: false, .. }));
        assert!(poll.state().alerts.is_notified());
        assert_eq!(poll.notifier().texts().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_last_status_and_retries_alert() {
        let mut poll = make_loop(vec![
            homework(100, "hw1", "approved"),
            homework(200, "hw1", "approved"),
        ]);
        poll.notifier().set_failing(true);

        let outcome = poll.tick().await;
        assert!(matches!(outcome, TickOutcome::Failed { alerted: false, .. }));
        assert_eq!(poll.state().last_status, None);
        assert_eq!(poll.state().cursor.as_str(), "100");
        assert!(!poll.state().alerts.is_notified());

        // Delivery recovers; the same status is still pending and gets reported.
        poll.notifier().set_failing(false);
        let outcome = poll.tick().await;
        assert_eq!(outcome, TickOutcome::Notified { status: "approved".into() });
        assert_eq!(poll.state().last_status.as_deref(), Some("approved"));
    }

    #[tokio::test]
    async fn test_repeated_failure_alerts_once() {
        let mut poll = make_loop(vec![connection_error(), connection_error()]);

        let first = poll.tick().await;
        let second = poll.tick().await;

        assert!(matches!(first, TickOutcome::Failed { alerted: true, .. }));
        assert!(matches!(second, TickOutcome::Failed { alerted: false, .. }));
        assert_eq!(
            poll.notifier().texts(),
            vec!["Сбой в работе программы: Ошибка эндпоинта connection refused"]
        );
        assert_eq!(poll.state().cursor.as_str(), "1");
    }

    #[tokio::test]
    async fn test_success_rearms_error_alerts() {
        let mut poll = make_loop(vec![
            connection_error(),
            Err(ReviewBotError::http_status(500)),
            Ok(json!({"current_date": 100, "homeworks": []})),
            connection_error(),
        ]);

        for _ in 0..4 {
            poll.tick().await;
        }

        let texts = poll.notifier().texts();
        assert_eq!(texts.len(), 2);
        assert!(texts.iter().all(|t| t.starts_with("Сбой в работе программы: ")));
    }

    #[tokio::test]
    async fn test_undelivered_alert_is_retried() {
        let mut poll = make_loop(vec![connection_error(), connection_error(), connection_error()]);
        poll.notifier().set_failing(true);

        let first = poll.tick().await;
        assert!(matches!(first, TickOutcome::Failed { alerted: false, .. }));

        poll.notifier().set_failing(false);
        let second = poll.tick().await;
        let third = poll.tick().await;

        assert!(matches!(second, TickOutcome::Failed { alerted: true, .. }));
        assert!(matches!(third, TickOutcome::Failed { alerted: false, .. }));
        assert_eq!(poll.notifier().texts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_between_iterations() {
        let api = Arc::new(ScriptedApi::new(vec![connection_error()]));
        let notifier = Arc::new(RecordingNotifier::default());
        let poll = PollLoop::new(api.clone(), notifier.clone(), "42", Duration::from_secs(600));

        let handle = tokio::spawn(poll.run());
        tokio::time::sleep(Duration::from_secs(601)).await;
        handle.abort();

        // t=0 fails, t=600 succeeds; sleep applies after the error too.
        assert_eq!(api.cursors().len(), 2);
        assert_eq!(notifier.texts().len(), 1);
    }
}
