//! Configuration validation.
//!
//! # Responsibilities
//! - Range checks shared by config files and programmatic constructors
//! - Collect every problem in a config, not just the first
//!
//! # Design Decisions
//! - Validation is a pure function: GuardConfig → Result<(), Vec<InvalidConfig>>
//! - Individual `check_*` helpers return the narrowed value on success

use std::time::Duration;

use thiserror::Error;

use crate::config::schema::{BackoffStrategy, GuardConfig};

/// A configuration value outside its permitted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidConfig {
    #[error("rate limit must be greater than 0")]
    ZeroLimit,

    #[error("window duration must be greater than 0")]
    ZeroWindow,

    #[error("max_attempts must not be negative (got {0})")]
    NegativeMaxAttempts(i64),

    #[error("max_attempts {0} exceeds the supported maximum of {max}", max = u32::MAX)]
    MaxAttemptsTooLarge(i64),

    #[error("max delay {max:?} is shorter than base delay {base:?}")]
    DelayBounds { base: Duration, max: Duration },
}

/// Check that a per-window limit is positive.
pub fn check_limit(limit: u64) -> Result<u64, InvalidConfig> {
    if limit == 0 {
        return Err(InvalidConfig::ZeroLimit);
    }
    Ok(limit)
}

/// Check that a window length is positive.
pub fn check_window(window: Duration) -> Result<Duration, InvalidConfig> {
    if window.is_zero() {
        return Err(InvalidConfig::ZeroWindow);
    }
    Ok(window)
}

/// Narrow a signed retry count to `u32`.
pub fn check_max_attempts(max_attempts: i64) -> Result<u32, InvalidConfig> {
    if max_attempts < 0 {
        return Err(InvalidConfig::NegativeMaxAttempts(max_attempts));
    }
    u32::try_from(max_attempts).map_err(|_| InvalidConfig::MaxAttemptsTooLarge(max_attempts))
}

/// Check that a growing backoff has a cap at least as large as its base.
pub fn check_delay_bounds(base: Duration, max: Duration) -> Result<(), InvalidConfig> {
    if max < base {
        return Err(InvalidConfig::DelayBounds { base, max });
    }
    Ok(())
}

/// Validate a whole configuration, returning every error found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<InvalidConfig>> {
    let mut errors = Vec::new();

    if let Err(e) = check_limit(config.rate_limit.limit) {
        errors.push(e);
    }
    if let Err(e) = check_window(Duration::from_millis(config.rate_limit.window_ms)) {
        errors.push(e);
    }
    if let Err(e) = check_max_attempts(config.retries.max_attempts) {
        errors.push(e);
    }
    if config.retries.strategy != BackoffStrategy::Constant {
        if let Err(e) = check_delay_bounds(
            Duration::from_millis(config.retries.base_delay_ms),
            Duration::from_millis(config.retries.max_delay_ms),
        ) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
