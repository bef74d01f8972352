//! Collaborator seams of the polling loop.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::PollCursor;

/// Source of homework review statuses.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch statuses updated since `from`. Returns the decoded JSON body
    /// unvalidated; transport and non-2xx failures are `ReviewBotError::Fetch`.
    async fn fetch(&self, from: &PollCursor) -> Result<Value>;
}

/// Outbound message channel (the notification sink).
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver `text` to `destination`. Any delivery failure is
    /// `ReviewBotError::Notification`.
    async fn send(&self, destination: &str, text: &str) -> Result<()>;
}

#[async_trait]
impl<T: HomeworkApi + ?Sized> HomeworkApi for std::sync::Arc<T> {
    async fn fetch(&self, from: &PollCursor) -> Result<Value> {
        (**self).fetch(from).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn send(&self, destination: &str, text: &str) -> Result<()> {
        (**self).send(destination, text).await
    }
}
