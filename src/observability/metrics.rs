//! Metrics collection.
//!
//! # Metrics
//! - `request_guard_admissions_total` (counter): admission decisions by `decision`
//! - `request_guard_tracked_keys` (gauge): keys holding limiter state after a prune
//! - `request_guard_retry_attempts_total` (counter): failed attempts of gated calls
//! - `request_guard_retry_outcomes_total` (counter): final outcome of gated calls
//!   by `outcome`

/// Final outcome of a retried call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Success,
    Exhausted,
    Cancelled,
    RateLimited,
}

impl RetryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryOutcome::Success => "success",
            RetryOutcome::Exhausted => "exhausted",
            RetryOutcome::Cancelled => "cancelled",
            RetryOutcome::RateLimited => "rate_limited",
        }
    }
}

pub fn record_admission(allowed: bool) {
    let decision = if allowed { "allowed" } else { "denied" };
    ::metrics::counter!("request_guard_admissions_total", "decision" => decision).increment(1);
}

pub fn record_tracked_keys(count: usize) {
    ::metrics::gauge!("request_guard_tracked_keys").set(count as f64);
}

pub fn record_retry_attempt() {
    ::metrics::counter!("request_guard_retry_attempts_total").increment(1);
}

pub fn record_retry_outcome(outcome: RetryOutcome) {
    ::metrics::counter!("request_guard_retry_outcomes_total", "outcome" => outcome.as_str())
        .increment(1);
}
