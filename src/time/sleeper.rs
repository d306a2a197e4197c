//! Suspend-for-duration primitives.
//!
//! # Responsibilities
//! - Suspend the calling task between retry attempts
//! - Let tests observe requested delays without real waiting
//!
//! # Design Decisions
//! - Returns a boxed `'static` future so the executor can race it against a
//!   cancellation signal with `tokio::select!`
//! - Dropping the returned future aborts the sleep

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::time::clock::ManualClock;

/// Something that can suspend the calling task.
pub trait Sleeper: Send + Sync {
    /// Resolve after at least `duration` has passed.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Sleeper backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// A sleeper that records every requested delay and returns immediately.
///
/// When linked to a [`ManualClock`], each sleep advances that clock by the
/// requested duration. A stalled sleeper records the delay and then never
/// resolves, which lets tests exercise cancellation deterministically.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
    clock: Option<ManualClock>,
    stalled: bool,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `clock` by every requested delay.
    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    /// Record delays but never wake up.
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::default()
        }
    }

    /// Delays requested so far, in order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sum of all requested delays.
    pub fn total_slept(&self) -> Duration {
        self.calls().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);

        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }

        if self.stalled {
            future::pending().boxed()
        } else {
            future::ready(()).boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Clock;
    use std::time::Instant;

    #[tokio::test]
    async fn test_recording_sleeper_returns_immediately() {
        let sleeper = RecordingSleeper::new();

        let start = Instant::now();
        sleeper.sleep(Duration::from_secs(30)).await;
        sleeper.sleep(Duration::from_secs(30)).await;

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(sleeper.call_count(), 2);
        assert_eq!(sleeper.total_slept(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_recording_sleeper_advances_linked_clock() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        let sleeper = RecordingSleeper::with_clock(clock.clone());

        sleeper.sleep(Duration::from_millis(500)).await;

        assert_eq!(clock.now() - t0, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_tokio_sleeper_waits() {
        let start = Instant::now();
        TokioSleeper.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_stalled_sleeper_never_wakes() {
        let sleeper = RecordingSleeper::stalled();
        let outcome =
            tokio::time::timeout(Duration::from_millis(20), sleeper.sleep(Duration::ZERO)).await;

        assert!(outcome.is_err());
        assert_eq!(sleeper.calls(), vec![Duration::ZERO]);
    }
}
