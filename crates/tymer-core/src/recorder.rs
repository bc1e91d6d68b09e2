use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::{
    domain::{InProgressSession, SessionRecord},
    store::SessionStore,
    Result,
};

/// Converts an in-progress session plus an end time into a persisted record.
///
/// Appends exactly once per session. The registry owns removing the session
/// from its active slot whether or not the append succeeds, so a storage
/// outage never leaves a chat stuck "active".
#[derive(Clone)]
pub struct SessionRecorder {
    store: Arc<dyn SessionStore>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn finalize(
        &self,
        session: &InProgressSession,
        ended_at: NaiveDateTime,
    ) -> Result<SessionRecord> {
        let minutes = (ended_at - session.started_at).num_milliseconds() as f64 / 60_000.0;
        let record = SessionRecord {
            chat: session.chat,
            started_at: session.started_at,
            ended_at,
            kind: session.kind,
            duration_minutes: round2(minutes),
        };

        self.store.append(&record).await?;
        println!(
            "[TIMER] Recorded {} session for chat {}: {} min",
            record.kind.as_str(),
            record.chat.0,
            record.duration_minutes
        );
        Ok(record)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, IntervalKind, MessageId, MessageRef};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::Mutex;

    struct MemStore {
        rows: Mutex<Vec<SessionRecord>>,
        fail: bool,
    }

    impl MemStore {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl SessionStore for MemStore {
        async fn append(&self, record: &SessionRecord) -> Result<()> {
            if self.fail {
                return Err(crate::Error::Persistence("sheet unavailable".to_string()));
            }
            self.rows.lock().await.push(record.clone());
            Ok(())
        }

        async fn query_by_chat_since(
            &self,
            chat: ChatId,
            since: NaiveDateTime,
        ) -> Result<Vec<SessionRecord>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .filter(|r| r.chat == chat && r.started_at >= since)
                .cloned()
                .collect())
        }
    }

    fn session_at(h: u32, m: u32, s: u32) -> InProgressSession {
        InProgressSession {
            chat: ChatId(42),
            kind: IntervalKind::Work,
            started_at: NaiveDate::from_ymd_opt(2026, 8, 24)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
            message: MessageRef {
                chat_id: ChatId(42),
                message_id: MessageId(1),
            },
        }
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[tokio::test]
    async fn duration_is_minutes_rounded_to_two_decimals() {
        let store = MemStore::new(false);
        let recorder = SessionRecorder::new(store.clone());

        let rec = recorder
            .finalize(&session_at(9, 0, 0), time(9, 10, 30))
            .await
            .unwrap();
        assert_eq!(rec.duration_minutes, 10.5);

        // 100 seconds = 1.666... minutes -> 1.67
        let rec = recorder
            .finalize(&session_at(9, 0, 0), time(9, 1, 40))
            .await
            .unwrap();
        assert_eq!(rec.duration_minutes, 1.67);

        assert_eq!(store.rows.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn duration_keeps_subsecond_precision() {
        let recorder = SessionRecorder::new(MemStore::new(false));

        // 30.5 s = 0.50833... min, which truncation to whole seconds
        // would flatten to 0.5.
        let ended = NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_milli_opt(9, 0, 30, 500)
            .unwrap();
        let rec = recorder
            .finalize(&session_at(9, 0, 0), ended)
            .await
            .unwrap();
        assert_eq!(rec.duration_minutes, 0.51);
    }

    #[tokio::test]
    async fn store_failure_propagates_as_persistence_error() {
        let recorder = SessionRecorder::new(MemStore::new(true));
        let err = recorder
            .finalize(&session_at(9, 0, 0), time(9, 25, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Persistence(_)));
    }
}
