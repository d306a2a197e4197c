//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! is_allowed(key):
//!     → per-key state looked up (created lazily on first sight)
//!     → clock read under the key's entry lock
//!     → admit or deny, state updated atomically
//!     → observability::metrics (admission counter)
//! ```
//!
//! # Design Decisions
//! - Limiters are plain values, constructed and passed explicitly; there is
//!   no process-wide instance
//! - Check-then-update for one key runs under that key's shard lock
//! - `is_allowed` never fails and never suspends
//! - Fixed window is the default; sliding log and token bucket trade memory
//!   or precision for avoiding the window-seam burst

pub mod fixed_window;
pub mod sliding_log;
pub mod token_bucket;

use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::RateLimitConfig;
use crate::config::validation::{check_limit, check_window, InvalidConfig};

pub use fixed_window::RateLimiter;
pub use sliding_log::SlidingWindowLog;
pub use token_bucket::TokenBucket;

/// Per-key admission decision.
pub trait Admission: Send + Sync {
    /// Whether one more request for `key` is admitted right now. Admitting
    /// consumes capacity.
    fn is_allowed(&self, key: &str) -> bool;
}

impl<A: Admission + ?Sized> Admission for Arc<A> {
    fn is_allowed(&self, key: &str) -> bool {
        (**self).is_allowed(key)
    }
}

/// Limit and window shared by every admission algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    limit: u64,
    window: Duration,
}

impl LimiterConfig {
    /// Fails with [`InvalidConfig`] if `limit` or `window` is zero.
    pub fn new(limit: u64, window: Duration) -> Result<Self, InvalidConfig> {
        Ok(Self {
            limit: check_limit(limit)?,
            window: check_window(window)?,
        })
    }

    /// Maximum admissions per key per window.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl TryFrom<&RateLimitConfig> for LimiterConfig {
    type Error = InvalidConfig;

    fn try_from(config: &RateLimitConfig) -> Result<Self, Self::Error> {
        Self::new(config.limit, Duration::from_millis(config.window_ms))
    }
}
