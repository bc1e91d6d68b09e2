//! Per-chat timer lifecycle manager.
//!
//! Owns the mapping from chat to the single active timer and its in-progress
//! session, and enforces at-most-one-active-timer-per-chat. Every transition
//! (stop, natural expiry, restart) finalizes exactly one session record.
//!
//! Locking model:
//! - `op_locks` serializes user-facing start/stop per chat (different chats
//!   proceed in parallel, no lock spans all chats).
//! - each chat's `Slot` owns the active timer. The cancel winner holds the
//!   op lock across finalization; the expiry winner holds the slot lock
//!   until its record is persisted. Either way nothing can install a
//!   successor before the prior session's append has resolved.

use std::{collections::HashMap, sync::Arc};

use chrono::{Local, NaiveDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    config::Config,
    domain::{ChatId, InProgressSession, IntervalKind, MessageRef},
    messaging::{port::MessagingPort, types::InlineKeyboard},
    recorder::SessionRecorder,
    timer::IntervalTimer,
    Result,
};

pub(crate) const STOPPED_TEXT: &str = "⏹ Timer stopped";

/// A chat's single active interval: the in-progress session plus its timer.
struct ActiveTimer {
    session: InProgressSession,
    timer: IntervalTimer,
}

type Slot = Arc<Mutex<Option<ActiveTimer>>>;

type NowFn = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum StopNotice {
    /// Edit the tracked start message ("timer stopped").
    Edit,
    /// Finalize silently; used when a restart supersedes the interval.
    Quiet,
}

#[derive(Clone)]
pub struct TimerRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    cfg: Arc<Config>,
    recorder: SessionRecorder,
    messenger: Arc<dyn MessagingPort>,
    now: NowFn,
    op_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
    slots: Mutex<HashMap<i64, Slot>>,
}

impl TimerRegistry {
    pub fn new(
        cfg: Arc<Config>,
        recorder: SessionRecorder,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self::with_now(cfg, recorder, messenger, || Local::now().naive_local())
    }

    /// Like [`TimerRegistry::new`] with an injected time source, so session
    /// timestamps can be driven from a controlled clock.
    pub fn with_now(
        cfg: Arc<Config>,
        recorder: SessionRecorder,
        messenger: Arc<dyn MessagingPort>,
        now: impl Fn() -> NaiveDateTime + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                cfg,
                recorder,
                messenger,
                now: Arc::new(now),
                op_locks: Mutex::new(HashMap::new()),
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start a new interval for `chat`, finalizing any running one first.
    ///
    /// Returns the reference of the "interval started" message carrying the
    /// stop button. Safe to call repeatedly in quick succession; the previous
    /// interval is always cleanly finalized before the new one begins.
    pub async fn start_interval(&self, chat: ChatId, kind: IntervalKind) -> Result<MessageRef> {
        let _op = self.op_lock(chat).await;
        self.finalize_existing(chat, StopNotice::Quiet).await;

        let text = start_text(&self.inner.cfg, kind);
        let message = self
            .inner
            .messenger
            .send_inline_keyboard(chat, &text, InlineKeyboard::stop_button())
            .await?;

        let session = InProgressSession {
            chat,
            kind,
            started_at: (self.inner.now)(),
            message,
        };

        let slot = self.slot(chat).await;
        let mut guard = slot.lock().await;
        let registry = self.clone();
        // No await between spawn and install: a firing timer blocks on this
        // slot lock until the new ActiveTimer is in place.
        let timer = IntervalTimer::spawn(self.inner.cfg.duration(kind), move || async move {
            registry.on_expiry(chat).await;
        });
        *guard = Some(ActiveTimer { session, timer });

        Ok(message)
    }

    /// Stop the chat's running interval, if any. Returns false (a benign
    /// no-op, not an error) when nothing is running.
    pub async fn stop_interval(&self, chat: ChatId) -> bool {
        let _op = self.op_lock(chat).await;
        self.finalize_existing(chat, StopNotice::Edit).await
    }

    /// True if the chat currently has a running interval.
    pub async fn is_active(&self, chat: ChatId) -> bool {
        match self.peek_slot(chat).await {
            Some(slot) => slot.lock().await.is_some(),
            None => false,
        }
    }

    /// Cancel + finalize the chat's active interval. Returns whether an
    /// interval existed.
    async fn finalize_existing(&self, chat: ChatId, notice: StopNotice) -> bool {
        let Some(slot) = self.peek_slot(chat).await else {
            return false;
        };
        let mut guard = slot.lock().await;
        let (claimed, settled) = match guard.as_ref() {
            Some(active) => (active.timer.outcome().claim_cancel(), active.timer.settled()),
            None => return false,
        };

        if claimed {
            let Some(active) = guard.take() else {
                return false;
            };
            drop(guard);

            // Quiescence: after this await the expiry callback can never run.
            active.timer.cancel().await;

            let ended_at = (self.inner.now)();
            self.record(&active.session, ended_at).await;

            if notice == StopNotice::Edit {
                if let Err(e) = self
                    .inner
                    .messenger
                    .edit_html(active.session.message, STOPPED_TEXT)
                    .await
                {
                    eprintln!("[TIMER] Failed to edit stop message for chat {}: {e}", chat.0);
                }
            }

            self.release_slot(chat).await;
        } else {
            // Expiry claimed this session first; its finalization owns the
            // record. Wait for it to settle so a restart never overlaps.
            drop(guard);
            settled.cancelled().await;
        }

        true
    }

    /// Natural-expiry path. Runs inside the timer task, only after the expiry
    /// side has already won the outcome claim; a concurrently cancelled timer
    /// never reaches this.
    async fn on_expiry(&self, chat: ChatId) {
        let Some(slot) = self.peek_slot(chat).await else {
            return;
        };
        let mut guard = slot.lock().await;
        let Some(active) = guard.as_ref() else {
            return;
        };
        let session = active.session.clone();
        let ended_at = (self.inner.now)();

        // Persist while the slot is still held so a racing restart cannot
        // install a successor until this record is durable.
        self.record(&session, ended_at).await;
        *guard = None;
        drop(guard);
        self.release_slot(chat).await;

        let finished = session.kind;
        let text = complete_text(&self.inner.cfg, finished);
        if let Err(e) = self
            .inner
            .messenger
            .send_inline_keyboard(chat, &text, InlineKeyboard::start_button(finished.next()))
            .await
        {
            eprintln!(
                "[TIMER] Failed to send completion notice for chat {}: {e}",
                chat.0
            );
        }
    }

    /// Persist the finalized session. Failures are logged and absorbed: the
    /// caller clears the chat's slot regardless, the duration data is
    /// dropped.
    async fn record(&self, session: &InProgressSession, ended_at: chrono::NaiveDateTime) {
        if let Err(e) = self.inner.recorder.finalize(session, ended_at).await {
            eprintln!(
                "[TIMER] Failed to persist {} session for chat {}: {e}",
                session.kind.as_str(),
                session.chat.0
            );
        }
    }

    async fn op_lock(&self, chat: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.op_locks.lock().await;
            map.entry(chat.0)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    async fn slot(&self, chat: ChatId) -> Slot {
        let mut map = self.inner.slots.lock().await;
        map.entry(chat.0)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    async fn peek_slot(&self, chat: ChatId) -> Option<Slot> {
        self.inner.slots.lock().await.get(&chat.0).cloned()
    }

    /// Drop the chat's slot entry once it holds no timer, so the map does
    /// not grow with every chat ever seen. Entries are recreated on demand;
    /// skipped when another task is mid-install.
    async fn release_slot(&self, chat: ChatId) {
        let mut map = self.inner.slots.lock().await;
        let Some(slot) = map.get(&chat.0).cloned() else {
            return;
        };
        if let Ok(guard) = slot.try_lock() {
            if guard.is_none() {
                drop(guard);
                map.remove(&chat.0);
            }
        };
    }
}

fn start_text(cfg: &Config, kind: IntervalKind) -> String {
    match kind {
        IntervalKind::Work => format!(
            "⏳ Work interval started ({} minutes). Stay focused!",
            cfg.minutes(IntervalKind::Work)
        ),
        IntervalKind::Break => format!(
            "☕ Break started ({} minutes). Time to recharge!",
            cfg.minutes(IntervalKind::Break)
        ),
    }
}

fn complete_text(cfg: &Config, finished: IntervalKind) -> String {
    match finished {
        IntervalKind::Work => format!(
            "⌛ Work interval complete! Time for a {} minute break.",
            cfg.minutes(IntervalKind::Break)
        ),
        IntervalKind::Break => format!(
            "✅ Break over! Ready for a new {} minute work interval?",
            cfg.minutes(IntervalKind::Work)
        ),
    }
}
