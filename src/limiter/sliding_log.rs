//! Sliding-window log rate limiter.
//!
//! Keeps the timestamp of every admitted request inside the window, so no
//! interval of length `window` ever contains more than `limit` admissions.
//! Memory per key grows with `limit`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::limiter::{Admission, LimiterConfig};
use crate::observability::metrics;
use crate::time::{Clock, SystemClock};

pub struct SlidingWindowLog {
    config: LimiterConfig,
    clock: Arc<dyn Clock>,
    logs: DashMap<String, VecDeque<Instant>>,
}

impl SlidingWindowLog {
    pub fn new(config: LimiterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            logs: DashMap::new(),
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.logs.len()
    }
}

impl Admission for SlidingWindowLog {
    fn is_allowed(&self, key: &str) -> bool {
        let mut log = self.logs.entry(key.to_owned()).or_default();
        let now = self.clock.now();
        let window = self.config.window();

        while log
            .front()
            .is_some_and(|&oldest| now.saturating_duration_since(oldest) >= window)
        {
            log.pop_front();
        }

        // limit fits in usize on every supported target
        let allowed = (log.len() as u64) < self.config.limit();
        if allowed {
            log.push_back(now);
        }
        drop(log);

        if !allowed {
            tracing::debug!(key, limit = self.config.limit(), "Rate limit exceeded");
        }
        metrics::record_admission(allowed);
        allowed
    }
}
