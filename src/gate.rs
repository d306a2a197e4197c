//! Rate-limited, retried calls.
//!
//! # Responsibilities
//! - Check admission once per call, before the first attempt
//! - Hand admitted calls to the retry executor
//! - Record the final outcome
//!
//! # Design Decisions
//! - Retries of an admitted call do not consume further admissions
//! - A denied call never invokes the operation
//! - Neither primitive knows about the other; this is the only place they meet

use std::future::Future;

use thiserror::Error;

use crate::limiter::Admission;
use crate::observability::metrics::{self, RetryOutcome};
use crate::resilience::{FailedAttempt, RetryError, RetryExecutor, RetryPolicy};

/// Failure of a gated call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError<E> {
    /// The key has used up its admissions for the current window.
    #[error("rate limit exceeded for key '{key}'")]
    RateLimited { key: String },

    /// The call was admitted but did not succeed.
    #[error("{0}")]
    Retry(RetryError<E>),
}

impl<E> GateError<E> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GateError::RateLimited { .. })
    }
}

/// An admission check in front of a retry executor.
///
/// `A` is usually an `Arc` of a limiter so the same limiter can be shared with
/// other gates or inspected by the caller.
#[derive(Debug, Clone)]
pub struct Gate<A> {
    admission: A,
    executor: RetryExecutor,
}

impl<A: Admission> Gate<A> {
    pub fn new(admission: A, executor: RetryExecutor) -> Self {
        Self {
            admission,
            executor,
        }
    }

    pub fn admission(&self) -> &A {
        &self.admission
    }

    /// Run `operation` for `key` if admitted.
    pub async fn call<T, E, Op, Fut>(
        &self,
        key: &str,
        policy: &RetryPolicy,
        operation: Op,
    ) -> Result<T, GateError<E>>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.call_with(key, policy, operation, std::future::pending::<()>(), |_| {})
            .await
    }

    /// Run `operation` for `key` if admitted, with cancellation and an
    /// observer for failed attempts.
    pub async fn call_with<T, E, Op, Fut, C, O>(
        &self,
        key: &str,
        policy: &RetryPolicy,
        operation: Op,
        cancel: C,
        mut observer: O,
    ) -> Result<T, GateError<E>>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Future<Output = ()>,
        O: FnMut(&FailedAttempt<'_, E>),
    {
        if !self.admission.is_allowed(key) {
            tracing::warn!(key, "Call rejected by rate limiter");
            metrics::record_retry_outcome(RetryOutcome::RateLimited);
            return Err(GateError::RateLimited {
                key: key.to_owned(),
            });
        }

        let result = self
            .executor
            .execute_with(policy, operation, cancel, |failed| {
                metrics::record_retry_attempt();
                observer(failed);
            })
            .await;

        match &result {
            Ok(_) => metrics::record_retry_outcome(RetryOutcome::Success),
            Err(RetryError::RetriesExhausted { attempts, .. }) => {
                tracing::warn!(key, attempts, "Call failed after exhausting retries");
                metrics::record_retry_outcome(RetryOutcome::Exhausted);
            }
            Err(RetryError::Cancelled { attempts }) => {
                tracing::info!(key, attempts, "Call cancelled while waiting to retry");
                metrics::record_retry_outcome(RetryOutcome::Cancelled);
            }
        }

        result.map_err(GateError::Retry)
    }
}
