use chrono::NaiveDateTime;

/// Telegram chat id (numeric). Unit of isolation for all timer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// One timed interval kind. Durations are fixed constants in `Config`,
/// not per-user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    Work,
    Break,
}

impl IntervalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalKind::Work => "work",
            IntervalKind::Break => "break",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "work" => Some(IntervalKind::Work),
            "break" => Some(IntervalKind::Break),
            _ => None,
        }
    }

    /// The kind suggested once an interval of this kind completes.
    pub fn next(&self) -> Self {
        match self {
            IntervalKind::Work => IntervalKind::Break,
            IntervalKind::Break => IntervalKind::Work,
        }
    }
}

/// A running interval. Owned exclusively by the registry until finalized;
/// removed the instant it is persisted or superseded.
#[derive(Clone, Debug)]
pub struct InProgressSession {
    pub chat: ChatId,
    pub kind: IntervalKind,
    pub started_at: NaiveDateTime,
    /// The "interval started" message, edited when the timer is stopped.
    pub message: MessageRef,
}

/// A completed interval as persisted to the sheet. Immutable once appended;
/// persisted rows are the only durable state.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    pub chat: ChatId,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub kind: IntervalKind,
    pub duration_minutes: f64,
}
