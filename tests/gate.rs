//! Composition of admission control and retries.

use std::sync::atomic::Ordering;
use std::time::Duration;

use request_guard::lifecycle::Shutdown;
use request_guard::time::RecordingSleeper;
use request_guard::{Gate, GateError, RetryError, RetryExecutor, RetryPolicy};

mod common;
use common::{always_fail, fail_then_succeed, manual_limiter, Unavailable};

#[tokio::test]
async fn test_admitted_calls_until_limit_then_rejected() {
    let (limiter, clock) = manual_limiter(2, Duration::from_secs(60));
    let gate = Gate::new(limiter, RetryExecutor::new(RecordingSleeper::new()));
    let policy = RetryPolicy::constant(3, Duration::from_millis(500)).unwrap();

    for _ in 0..2 {
        let (op, _) = fail_then_succeed(1, "data");
        assert_eq!(gate.call("U", &policy, op).await, Ok("data"));
    }

    let (op, calls) = fail_then_succeed(0, "data");
    let err = gate.call("U", &policy, op).await.unwrap_err();
    assert_eq!(
        err,
        GateError::RateLimited {
            key: "U".to_string()
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    clock.advance(Duration::from_secs(60));
    let (op, _) = fail_then_succeed(0, "data");
    assert!(gate.call("U", &policy, op).await.is_ok());
}

#[tokio::test]
async fn test_exhaustion_passes_through() {
    let (limiter, _clock) = manual_limiter(5, Duration::from_secs(60));
    let sleeper = RecordingSleeper::new();
    let gate = Gate::new(limiter, RetryExecutor::new(sleeper.clone()));
    let policy = RetryPolicy::constant(1, Duration::from_millis(500)).unwrap();
    let (op, _) = always_fail();

    let err = gate.call("U", &policy, op).await.unwrap_err();

    assert_eq!(
        err,
        GateError::Retry(RetryError::RetriesExhausted {
            attempts: 2,
            last_error: Unavailable(2),
        })
    );
    assert_eq!(sleeper.call_count(), 1);
}

#[tokio::test]
async fn test_cancelled_call_reports_cancelled() {
    let (limiter, _clock) = manual_limiter(5, Duration::from_secs(60));
    let gate = Gate::new(limiter, RetryExecutor::new(RecordingSleeper::stalled()));
    let policy = RetryPolicy::constant(3, Duration::from_millis(500)).unwrap();
    let shutdown = Shutdown::new();
    shutdown.trigger();
    let (op, _) = always_fail();

    let mut failures = 0;
    let err = gate
        .call_with("U", &policy, op, shutdown.cancelled(), |_| failures += 1)
        .await
        .unwrap_err();

    assert_eq!(err, GateError::Retry(RetryError::Cancelled { attempts: 1 }));
    assert_eq!(failures, 1);
}
