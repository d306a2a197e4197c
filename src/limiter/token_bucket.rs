//! Per-key token bucket rate limiter.
//!
//! Each key's bucket holds up to `limit` tokens and refills continuously at
//! `limit / window` tokens per second. A request costs one token.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::limiter::{Admission, LimiterConfig};
use crate::observability::metrics;
use crate::time::{Clock, SystemClock};

/// A simple token bucket.
struct Bucket {
    tokens: f64,
    last_update: Instant,
}

impl Bucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = self.last_update.max(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    clock: Arc<dyn Clock>,
    buckets: DashMap<String, Bucket>,
}

impl TokenBucket {
    pub fn new(config: LimiterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = config.limit() as f64;
        Self {
            capacity,
            refill_rate: capacity / config.window().as_secs_f64(),
            clock,
            buckets: DashMap::new(),
        }
    }

    /// Tokens per second added to every bucket.
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }
}

impl Admission for TokenBucket {
    fn is_allowed(&self, key: &str) -> bool {
        let allowed = {
            let mut bucket = self
                .buckets
                .entry(key.to_owned())
                .or_insert_with(|| Bucket::new(self.capacity, self.clock.now()));
            bucket.try_acquire(self.clock.now(), self.capacity, self.refill_rate)
        };

        if !allowed {
            tracing::debug!(key, limit = self.capacity as u64, "Rate limit exceeded");
        }
        metrics::record_admission(allowed);
        allowed
    }
}
