//! Reconnect scheduling.
//!
//! [`ReconnectTimer`] is a two-state tag: `Idle` or `PendingRetry`. A retry
//! can only be scheduled from `Idle`, so however many close or error
//! signals a dying session produces, at most one retry is ever pending.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};

/// At most one pending reconnect attempt.
#[derive(Debug, Default)]
pub enum ReconnectTimer {
    /// No retry scheduled.
    #[default]
    Idle,
    /// A retry fires when the sleep completes.
    PendingRetry(Pin<Box<Sleep>>),
}

impl ReconnectTimer {
    /// Creates an idle timer.
    #[must_use]
    pub fn new() -> Self {
        Self::Idle
    }

    /// Schedules a retry after `delay`.
    ///
    /// Returns `false`, leaving the pending retry untouched, if one is
    /// already scheduled.
    pub fn schedule(&mut self, delay: Duration) -> bool {
        match self {
            Self::PendingRetry(_) => false,
            Self::Idle => {
                *self = Self::PendingRetry(Box::pin(tokio::time::sleep(delay)));
                true
            }
        }
    }

    /// Returns `true` while a retry is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingRetry(_))
    }

    /// Instant at which the pending retry fires.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::PendingRetry(sleep) => Some(sleep.deadline()),
        }
    }

    /// Waits for the pending retry to fire and returns to `Idle`.
    ///
    /// Returns `false` immediately when nothing is scheduled.
    pub async fn fired(&mut self) -> bool {
        let Self::PendingRetry(sleep) = self else {
            return false;
        };
        sleep.as_mut().await;
        *self = Self::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, assert_ready_eq, task};

    use super::*;

    const DELAY: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn repeated_close_signals_keep_a_single_retry() {
        let mut timer = ReconnectTimer::new();
        assert!(timer.schedule(DELAY));
        let first_deadline = timer.deadline();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!timer.schedule(DELAY));
        assert!(!timer.schedule(Duration::from_secs(1)));
        assert_eq!(timer.deadline(), first_deadline);
        assert!(timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay_then_accepts_new_schedule() {
        let mut timer = ReconnectTimer::new();
        assert!(timer.schedule(DELAY));

        {
            let mut fired = task::spawn(timer.fired());
            assert_pending!(fired.poll());
            tokio::time::advance(Duration::from_secs(4)).await;
            assert_pending!(fired.poll());
            tokio::time::advance(Duration::from_secs(1)).await;
            assert_ready_eq!(fired.poll(), true);
        }

        assert!(!timer.is_pending());
        assert!(timer.schedule(DELAY));
    }

    #[tokio::test]
    async fn idle_timer_does_not_wait() {
        let mut timer = ReconnectTimer::new();
        assert!(!timer.fired().await);
        assert_eq!(timer.deadline(), None);
    }
}
