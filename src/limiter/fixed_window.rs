//! Fixed-window counter rate limiter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::validation::InvalidConfig;
use crate::limiter::{Admission, LimiterConfig};
use crate::observability::metrics;
use crate::time::{Clock, SystemClock};

/// Counter for one key's current window.
#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u64,
    window_start: Instant,
}

impl WindowState {
    fn open(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }

    fn try_admit(&mut self, now: Instant, config: &LimiterConfig) -> bool {
        if self.is_expired(now, config.window()) {
            *self = Self::open(now);
            return true;
        }
        if self.count < config.limit() {
            self.count += 1;
            return true;
        }
        false
    }
}

/// Per-key fixed-window rate limiter.
///
/// Each key's window opens at its first request and lasts `window`. Within a
/// window at most `limit` requests are admitted; the first request at or after
/// the window's end opens a new window. Up to `2 * limit` requests can pass
/// around a window boundary.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use request_guard::limiter::RateLimiter;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(60)).unwrap();
/// assert!(limiter.is_allowed("alice"));
/// assert!(limiter.is_allowed("alice"));
/// assert!(!limiter.is_allowed("alice"));
/// assert!(limiter.is_allowed("bob"));
/// ```
pub struct RateLimiter {
    config: LimiterConfig,
    clock: Arc<dyn Clock>,
    windows: DashMap<String, WindowState>,
}

impl RateLimiter {
    /// Create a limiter admitting `limit` requests per key per `window`.
    pub fn new(limit: u64, window: Duration) -> Result<Self, InvalidConfig> {
        Ok(Self::from_config(LimiterConfig::new(limit, window)?))
    }

    /// Create a limiter on the system clock.
    pub fn from_config(config: LimiterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a limiter reading time from `clock`.
    pub fn with_clock(config: LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: DashMap::new(),
        }
    }

    pub fn config(&self) -> LimiterConfig {
        self.config
    }

    /// Admit or deny one request for `key`.
    pub fn is_allowed(&self, key: &str) -> bool {
        let allowed = match self.windows.entry(key.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(WindowState::open(self.clock.now()));
                true
            }
            Entry::Occupied(mut entry) => entry.get_mut().try_admit(self.clock.now(), &self.config),
        };

        metrics::record_admission(allowed);
        if !allowed {
            tracing::debug!(key, limit = self.config.limit(), "Rate limit exceeded");
        }
        allowed
    }

    /// Requests `key` may still make in its current window.
    pub fn remaining(&self, key: &str) -> u64 {
        let now = self.clock.now();
        match self.windows.get(key) {
            Some(state) if !state.is_expired(now, self.config.window()) => {
                self.config.limit().saturating_sub(state.count)
            }
            _ => self.config.limit(),
        }
    }

    /// Number of keys currently holding window state.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Drop state for keys whose window has fully elapsed.
    ///
    /// A pruned key behaves exactly as if its window had rolled over, so this
    /// never changes an admission decision. Returns the number of keys removed.
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.window();
        let before = self.windows.len();
        self.windows.retain(|_, state| !state.is_expired(now, window));

        let after = self.windows.len();
        metrics::record_tracked_keys(after);
        before.saturating_sub(after)
    }
}

impl Admission for RateLimiter {
    fn is_allowed(&self, key: &str) -> bool {
        RateLimiter::is_allowed(self, key)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked_keys", &self.windows.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    fn limiter(limit: u64, window_ms: u64) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new();
        let config = LimiterConfig::new(limit, Duration::from_millis(window_ms)).unwrap();
        (RateLimiter::with_clock(config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_first_request_opens_window() {
        let (limiter, _clock) = limiter(1, 1000);
        assert_eq!(limiter.tracked_keys(), 0);
        assert!(limiter.is_allowed("a"));
        assert_eq!(limiter.tracked_keys(), 1);
        assert!(!limiter.is_allowed("a"));
    }

    #[test]
    fn test_window_anchored_at_first_request() {
        let (limiter, clock) = limiter(2, 1000);
        clock.advance(Duration::from_millis(700));
        assert!(limiter.is_allowed("a"));
        assert!(limiter.is_allowed("a"));

        // 999ms into the key's window, not 1699ms since the clock started
        clock.advance(Duration::from_millis(999));
        assert!(!limiter.is_allowed("a"));

        clock.advance(Duration::from_millis(1));
        assert!(limiter.is_allowed("a"));
    }

    #[test]
    fn test_denial_does_not_mutate_state() {
        let (limiter, clock) = limiter(1, 1000);
        assert!(limiter.is_allowed("a"));
        for _ in 0..10 {
            assert!(!limiter.is_allowed("a"));
        }
        clock.advance(Duration::from_millis(1000));
        assert!(limiter.is_allowed("a"));
    }

    #[test]
    fn test_remaining() {
        let (limiter, clock) = limiter(3, 1000);
        assert_eq!(limiter.remaining("a"), 3);
        limiter.is_allowed("a");
        limiter.is_allowed("a");
        assert_eq!(limiter.remaining("a"), 1);
        clock.advance(Duration::from_millis(1000));
        assert_eq!(limiter.remaining("a"), 3);
    }

    #[test]
    fn test_prune_expired_only_drops_elapsed_windows() {
        let (limiter, clock) = limiter(1, 1000);
        limiter.is_allowed("old");
        clock.advance(Duration::from_millis(600));
        limiter.is_allowed("fresh");
        clock.advance(Duration::from_millis(400));

        assert_eq!(limiter.prune_expired(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert!(!limiter.is_allowed("fresh"));
        assert!(limiter.is_allowed("old"));
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            RateLimiter::new(0, Duration::from_secs(1)).unwrap_err(),
            InvalidConfig::ZeroLimit
        );
        assert_eq!(
            RateLimiter::new(1, Duration::ZERO).unwrap_err(),
            InvalidConfig::ZeroWindow
        );
    }
}
