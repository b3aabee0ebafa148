//! Deferred and repeating timer events.
//!
//! A page runs its controller on a single event loop fed by one channel.
//! Timers never call into a controller; they post an event onto that channel
//! and the loop handles it like any user input. Every scheduled task hands
//! back a [`TaskHandle`] so the owner can cancel it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// Handle to a scheduled task.
///
/// Dropping the handle does not cancel the task; call [`cancel`](Self::cancel).
#[derive(Debug, Clone)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl TaskHandle {
    /// Cancel the task. Cancelling a finished task is a no-op.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.abort.abort();
    }

    /// Check if [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Check if the task has stopped, by firing or by cancellation.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    /// Whether the task may still post an event.
    ///
    /// False as soon as [`cancel`](Self::cancel) returns, even if the runtime
    /// has not yet reaped the aborted task.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.is_cancelled() && !self.is_finished()
    }
}

/// Posts events onto a page's event channel, now or later.
#[derive(Debug)]
pub struct Scheduler<E> {
    tx: mpsc::UnboundedSender<E>,
}

impl<E> Clone for Scheduler<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Send + 'static> Scheduler<E> {
    /// Create a scheduler posting onto `tx`.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<E>) -> Self {
        Self { tx }
    }

    /// Create a scheduler together with the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Post an event immediately.
    ///
    /// Returns `false` if the event loop has gone away.
    pub fn post(&self, event: E) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Post `event` once, after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn after(&self, delay: Duration, event: E) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::SeqCst) && tx.send(event).is_err() {
                trace!("Event loop closed before deferred event fired");
            }
        });

        TaskHandle {
            cancelled,
            abort: task.abort_handle(),
        }
    }

    /// Post an event built by `make` every `period`, first after one period.
    ///
    /// Stops on its own once the event loop has gone away.
    /// Must be called from within a tokio runtime.
    pub fn every<F>(&self, period: Duration, make: F) -> TaskHandle
    where
        F: Fn() -> E + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            // First tick one period out, not immediately
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                // Cancelled between ticks
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(make()).is_err() {
                    trace!("Event loop closed, stopping repeating task");
                    break;
                }
            }
        });

        TaskHandle {
            cancelled,
            abort: task.abort_handle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ping {
        Once,
        Tick,
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once_after_delay() {
        let (scheduler, mut rx) = Scheduler::channel();
        let start = Instant::now();

        let handle = scheduler.after(Duration::from_secs(2), Ping::Once);

        assert_eq!(rx.recv().await, Some(Ping::Once));
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(!handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_firing() {
        let (scheduler, mut rx) = Scheduler::channel();

        let handle = scheduler.after(Duration::from_secs(2), Ping::Once);
        assert!(handle.is_pending());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(!handle.is_pending());

        let result = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(result.is_err(), "cancelled task must not post");
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_repeats_with_period() {
        let (scheduler, mut rx) = Scheduler::channel();
        let start = Instant::now();

        let handle = scheduler.every(Duration::from_secs(8), || Ping::Tick);

        for n in 1..=3u32 {
            assert_eq!(rx.recv().await, Some(Ping::Tick));
            assert!(start.elapsed() >= Duration::from_secs(8) * n);
        }

        handle.cancel();
        let result = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await;
        assert!(result.is_err(), "cancelled repeating task must stop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_noop() {
        let (scheduler, mut rx) = Scheduler::channel();

        let handle = scheduler.after(Duration::from_millis(10), Ping::Once);
        assert_eq!(rx.recv().await, Some(Ping::Once));

        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_post_reports_closed_loop() {
        let (scheduler, rx) = Scheduler::<Ping>::channel();
        assert!(scheduler.post(Ping::Once));

        drop(rx);
        assert!(!scheduler.post(Ping::Once));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_stops_when_loop_closes() {
        let (scheduler, rx) = Scheduler::channel();
        let handle = scheduler.every(Duration::from_secs(1), || Ping::Tick);
        drop(rx);

        tokio::time::sleep(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        assert!(handle.is_finished());
    }
}
