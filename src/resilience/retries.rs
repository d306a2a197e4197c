//! Retry logic.
//!
//! # Responsibilities
//! - Invoke a caller-supplied operation until it succeeds or the policy is
//!   exhausted
//! - Suspend between attempts for a delay computed from the failures so far
//! - Stop early when an external cancellation signal fires during a wait
//!
//! # Design Decisions
//! - `max_attempts` counts retries, so `n` allows `n + 1` invocations
//! - Only the last failure is kept; earlier ones are reported to the
//!   observer and dropped
//! - The executor does not log; callers log from the observer

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::RetryConfig;
use crate::config::validation::{check_max_attempts, InvalidConfig};
use crate::resilience::backoff::Backoff;
use crate::time::{Sleeper, TokioSleeper};

type DelayFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// How many times to retry and how long to wait in between.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: DelayFn,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &"<fn>")
            .finish()
    }
}

impl RetryPolicy {
    /// Build a policy from a retry count and an arbitrary delay function.
    ///
    /// `delay` receives the number of failures observed so far (starting at 1).
    /// Fails with [`InvalidConfig`] when `max_attempts` is negative.
    pub fn new<F>(max_attempts: i64, delay: F) -> Result<Self, InvalidConfig>
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Ok(Self {
            max_attempts: check_max_attempts(max_attempts)?,
            delay: Arc::new(delay),
        })
    }

    /// Build a policy whose delays come from a [`Backoff`].
    pub fn from_backoff(max_attempts: i64, backoff: Backoff) -> Result<Self, InvalidConfig> {
        Self::new(max_attempts, move |attempt| backoff.delay(attempt))
    }

    /// Retry up to `max_attempts` times with a fixed delay.
    pub fn constant(max_attempts: i64, delay: Duration) -> Result<Self, InvalidConfig> {
        Self::from_backoff(max_attempts, Backoff::constant(delay))
    }

    /// A single attempt, never retried.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            delay: Arc::new(|_| Duration::ZERO),
        }
    }

    /// Number of retries allowed after the initial attempt.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the retry following failure number `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        (self.delay)(attempt)
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = InvalidConfig;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        let backoff = Backoff::try_from(config)?;
        Self::from_backoff(config.max_attempts, backoff)
    }
}

/// Terminal failure of a retried operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every permitted attempt failed.
    #[error("all {attempts} attempts failed, last error: {last_error}")]
    RetriesExhausted { attempts: u64, last_error: E },

    /// A cancellation signal fired while waiting to retry.
    #[error("retry cancelled after {attempts} failed attempt(s)")]
    Cancelled { attempts: u64 },
}

impl<E> RetryError<E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u64 {
        match self {
            RetryError::RetriesExhausted { attempts, .. } | RetryError::Cancelled { attempts } => {
                *attempts
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    /// The last failure, if the retries ran out.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::RetriesExhausted { last_error, .. } => Some(last_error),
            RetryError::Cancelled { .. } => None,
        }
    }

    pub fn into_last_error(self) -> Option<E> {
        match self {
            RetryError::RetriesExhausted { last_error, .. } => Some(last_error),
            RetryError::Cancelled { .. } => None,
        }
    }
}

/// A failed invocation, as reported to an observer.
#[derive(Debug)]
pub struct FailedAttempt<'a, E> {
    /// 1-based count of failures so far.
    pub attempt: u64,
    pub error: &'a E,
    /// Wait before the next attempt, or `None` when this failure is final.
    pub next_delay: Option<Duration>,
}

/// Runs operations under a [`RetryPolicy`].
///
/// Cheap to clone; clones share the sleeper. Concurrent calls share nothing
/// else.
#[derive(Clone)]
pub struct RetryExecutor {
    sleeper: Arc<dyn Sleeper>,
}

impl RetryExecutor {
    /// Create an executor that waits with `sleeper`.
    pub fn new<S>(sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        Self {
            sleeper: Arc::new(sleeper),
        }
    }

    /// Create an executor around an already shared sleeper.
    pub fn with_sleeper(sleeper: Arc<dyn Sleeper>) -> Self {
        Self { sleeper }
    }

    /// Run `operation` until it succeeds or `policy` is exhausted.
    pub async fn execute<T, E, Op, Fut>(
        &self,
        policy: &RetryPolicy,
        operation: Op,
    ) -> Result<T, RetryError<E>>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with(policy, operation, std::future::pending::<()>(), |_| {})
            .await
    }

    /// Like [`execute`](Self::execute), but gives up with
    /// [`RetryError::Cancelled`] if `cancel` completes while waiting.
    pub async fn execute_with_cancel<T, E, Op, Fut, C>(
        &self,
        policy: &RetryPolicy,
        operation: Op,
        cancel: C,
    ) -> Result<T, RetryError<E>>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Future<Output = ()>,
    {
        self.execute_with(policy, operation, cancel, |_| {}).await
    }

    /// Full form: cancellation signal plus an observer that sees every
    /// failed attempt before the executor waits or gives up.
    ///
    /// The operation itself is never interrupted; `cancel` is only polled
    /// while suspended between attempts.
    pub async fn execute_with<T, E, Op, Fut, C, O>(
        &self,
        policy: &RetryPolicy,
        mut operation: Op,
        cancel: C,
        mut observer: O,
    ) -> Result<T, RetryError<E>>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Future<Output = ()>,
        O: FnMut(&FailedAttempt<'_, E>),
    {
        tokio::pin!(cancel);

        let max_attempts = u64::from(policy.max_attempts());
        let mut attempt: u64 = 0;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            attempt += 1;
            if attempt > max_attempts {
                observer(&FailedAttempt {
                    attempt,
                    error: &error,
                    next_delay: None,
                });
                return Err(RetryError::RetriesExhausted {
                    attempts: attempt,
                    last_error: error,
                });
            }

            // attempt <= max_attempts <= u32::MAX here
            let delay = policy.delay(u32::try_from(attempt).unwrap_or(u32::MAX));
            observer(&FailedAttempt {
                attempt,
                error: &error,
                next_delay: Some(delay),
            });
            drop(error);

            tokio::select! {
                biased;
                () = &mut cancel => {
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                () = self.sleeper.sleep(delay) => {}
            }
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(TokioSleeper)
    }
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor").finish_non_exhaustive()
    }
}
