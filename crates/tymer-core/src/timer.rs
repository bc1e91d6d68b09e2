//! Owned, cancellable one-shot timer for a single interval.
//!
//! Cancellation and natural expiry race to finalize the same session. The
//! race is decided by one atomic compare-and-swap on a tri-state outcome;
//! whichever side loses observes the settled state and must skip
//! finalization entirely.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const RUNNING: u8 = 0;
const CANCELLED: u8 = 1;
const EXPIRED: u8 = 2;

/// Tri-state settlement of one interval: Running, Cancelled, or Expired.
#[derive(Debug, Default)]
pub struct TimerOutcome(AtomicU8);

impl TimerOutcome {
    pub fn new() -> Self {
        Self(AtomicU8::new(RUNNING))
    }

    /// Returns true if this call won the right to finalize via cancellation.
    pub fn claim_cancel(&self) -> bool {
        self.0
            .compare_exchange(RUNNING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns true if this call won the right to finalize via expiry.
    pub fn claim_expiry(&self) -> bool {
        self.0
            .compare_exchange(RUNNING, EXPIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_settled(&self) -> bool {
        self.0.load(Ordering::Acquire) != RUNNING
    }
}

/// A spawned countdown bound 1:1 to an in-progress session.
pub struct IntervalTimer {
    cancel: CancellationToken,
    settled: CancellationToken,
    handle: JoinHandle<()>,
    outcome: Arc<TimerOutcome>,
}

impl IntervalTimer {
    /// Start counting down immediately without blocking the caller.
    ///
    /// `on_expiry` runs only if natural expiry wins the outcome claim; a
    /// timer cancelled first never fires it.
    pub fn spawn<F, Fut>(delay: Duration, on_expiry: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let settled = CancellationToken::new();
        let outcome = Arc::new(TimerOutcome::new());

        let tok = cancel.clone();
        let done = settled.clone();
        let out = outcome.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
              _ = tok.cancelled() => {}
              _ = sleep(delay) => {
                if out.claim_expiry() {
                  on_expiry().await;
                }
              }
            }
            done.cancel();
        });

        Self {
            cancel,
            settled,
            handle,
            outcome,
        }
    }

    pub fn outcome(&self) -> &TimerOutcome {
        &self.outcome
    }

    /// Completed once the timer task has fully exited, including any
    /// expiry-side finalization. Lets a caller that lost the outcome claim
    /// wait for the winner without owning the join handle.
    pub fn settled(&self) -> CancellationToken {
        self.settled.clone()
    }

    /// Cancel and wait until the task is quiescent. After this returns the
    /// delayed action can never fire. Callers must claim the cancel outcome
    /// first; cancelling a timer whose expiry already won is a no-op.
    pub async fn cancel(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn outcome_settles_exactly_once() {
        let out = TimerOutcome::new();
        assert!(!out.is_settled());

        assert!(out.claim_cancel());
        assert!(out.is_settled());
        assert!(!out.claim_expiry());
        assert!(!out.claim_cancel());

        let out = TimerOutcome::new();
        assert!(out.claim_expiry());
        assert!(!out.claim_cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = fired.clone();
        let timer = IntervalTimer::spawn(Duration::from_secs(60), move || async move {
            fired2.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(61)).await;
        timer.settled().cancelled().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = fired.clone();
        let timer = IntervalTimer::spawn(Duration::from_secs(60), move || async move {
            fired2.fetch_add(1, Ordering::SeqCst);
        });

        assert!(timer.outcome().claim_cancel());
        timer.cancel().await;

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
