use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    domain::{ChatId, SessionRecord},
    Result,
};

/// Port to the spreadsheet-like session store.
///
/// Append-only from the core's point of view. A failed append is logged and
/// not retried; the affected session's duration data is considered lost.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn append(&self, record: &SessionRecord) -> Result<()>;

    /// All records for `chat` whose `started_at` is at or after `since`,
    /// in append order. An empty result is a valid, reportable state.
    async fn query_by_chat_since(
        &self,
        chat: ChatId,
        since: NaiveDateTime,
    ) -> Result<Vec<SessionRecord>>;
}
