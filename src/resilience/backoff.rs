//! Delay strategies between retry attempts.

use std::time::Duration;

use rand::Rng;

use crate::config::schema::{BackoffStrategy, RetryConfig};
use crate::config::validation::{check_delay_bounds, InvalidConfig};

/// A delay function of the attempt number, with an optional cap and jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    strategy: BackoffStrategy,
    base: Duration,
    max: Duration,
    jitter: bool,
}

impl Backoff {
    /// The same delay before every retry.
    pub fn constant(delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Constant,
            base: delay,
            max: delay,
            jitter: false,
        }
    }

    /// `base * attempt`, capped at `max`.
    pub fn linear(base: Duration, max: Duration) -> Result<Self, InvalidConfig> {
        check_delay_bounds(base, max)?;
        Ok(Self {
            strategy: BackoffStrategy::Linear,
            base,
            max,
            jitter: false,
        })
    }

    /// `base * 2^(attempt - 1)`, capped at `max`.
    pub fn exponential(base: Duration, max: Duration) -> Result<Self, InvalidConfig> {
        check_delay_bounds(base, max)?;
        Ok(Self {
            strategy: BackoffStrategy::Exponential,
            base,
            max,
            jitter: false,
        })
    }

    /// Add up to 10% random jitter on top of each computed delay.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub fn strategy(&self) -> BackoffStrategy {
        self.strategy
    }

    /// Delay before the retry that follows failure number `attempt`.
    ///
    /// Attempt 0 means nothing has failed yet and always yields zero.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay = match self.strategy {
            BackoffStrategy::Constant => self.base,
            BackoffStrategy::Linear => self.base.saturating_mul(attempt).min(self.max),
            BackoffStrategy::Exponential => 2u32
                .checked_pow(attempt - 1)
                .and_then(|factor| self.base.checked_mul(factor))
                .map_or(self.max, |d| d.min(self.max)),
        };

        if self.jitter {
            apply_jitter(delay)
        } else {
            delay
        }
    }
}

impl TryFrom<&RetryConfig> for Backoff {
    type Error = InvalidConfig;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        let base = Duration::from_millis(config.base_delay_ms);
        let max = Duration::from_millis(config.max_delay_ms);

        let backoff = match config.strategy {
            BackoffStrategy::Constant => Self::constant(base),
            BackoffStrategy::Linear => Self::linear(base, max)?,
            BackoffStrategy::Exponential => Self::exponential(base, max)?,
        };

        Ok(if config.jitter { backoff.with_jitter() } else { backoff })
    }
}

/// Add 0 to 10% of `delay` at random.
fn apply_jitter(delay: Duration) -> Duration {
    let jitter_range = delay / 10;
    if jitter_range.is_zero() {
        return delay;
    }
    let fraction: f64 = rand::thread_rng().gen_range(0.0..1.0);
    delay + jitter_range.mul_f64(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_attempt() {
        let backoff = Backoff::constant(Duration::from_millis(500));
        assert_eq!(backoff.delay(1), Duration::from_millis(500));
        assert_eq!(backoff.delay(9), Duration::from_millis(500));
        assert_eq!(backoff.delay(0), Duration::ZERO);
    }

    #[test]
    fn test_linear_growth_and_cap() {
        let backoff =
            Backoff::linear(Duration::from_millis(100), Duration::from_millis(250)).unwrap();
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let backoff =
            Backoff::exponential(Duration::from_millis(100), Duration::from_millis(2000)).unwrap();
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(400));
        assert_eq!(backoff.delay(10), Duration::from_millis(2000));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_millis(2000));
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let backoff = Backoff::constant(Duration::from_millis(1000)).with_jitter();
        for _ in 0..100 {
            let d = backoff.delay(1);
            assert!(d >= Duration::from_millis(1000));
            assert!(d <= Duration::from_millis(1100));
        }
    }

    #[test]
    fn test_cap_below_base_rejected() {
        let err = Backoff::exponential(Duration::from_secs(2), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, InvalidConfig::DelayBounds { .. }));
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig {
            strategy: BackoffStrategy::Linear,
            base_delay_ms: 1000,
            max_delay_ms: 3000,
            ..RetryConfig::default()
        };
        let backoff = Backoff::try_from(&config).unwrap();
        assert_eq!(backoff.strategy(), BackoffStrategy::Linear);
        assert_eq!(backoff.delay(5), Duration::from_millis(3000));
    }
}
