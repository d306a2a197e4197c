//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use request_guard::limiter::LimiterConfig;
use request_guard::time::ManualClock;
use request_guard::RateLimiter;

/// Failure returned by scripted operations; carries the attempt number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unavailable(pub u32);

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "service unavailable (call {})", self.0)
    }
}

impl std::error::Error for Unavailable {}

/// An operation that fails `failures` times, then succeeds with `value`.
///
/// Returns the operation and a shared invocation counter.
pub fn fail_then_succeed<T>(
    failures: u32,
    value: T,
) -> (
    impl FnMut() -> std::future::Ready<Result<T, Unavailable>>,
    Arc<AtomicU32>,
)
where
    T: Clone,
{
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let op = move || {
        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= failures {
            std::future::ready(Err(Unavailable(call)))
        } else {
            std::future::ready(Ok(value.clone()))
        }
    };
    (op, calls)
}

/// An operation that always fails.
pub fn always_fail() -> (
    impl FnMut() -> std::future::Ready<Result<(), Unavailable>>,
    Arc<AtomicU32>,
) {
    fail_then_succeed(u32::MAX, ())
}

/// A fixed-window limiter on a manual clock.
pub fn manual_limiter(limit: u64, window: Duration) -> (Arc<RateLimiter>, ManualClock) {
    let clock = ManualClock::new();
    let config = LimiterConfig::new(limit, window).unwrap();
    let limiter = RateLimiter::with_clock(config, Arc::new(clock.clone()));
    (Arc::new(limiter), clock)
}

/// Run `f` and fail the test if it takes longer than a second.
pub async fn within_a_second<F: Future>(f: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(1), f)
        .await
        .expect("future did not complete in time")
}
