//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Retry policy for outbound operations.
    pub retries: RetryConfig,

    /// Per-key admission control.
    pub rate_limit: RateLimitConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Shape of the delay between attempts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Always `base_delay_ms`.
    #[default]
    Constant,
    /// `base_delay_ms * attempt`, capped at `max_delay_ms`.
    Linear,
    /// `base_delay_ms * 2^(attempt - 1)`, capped at `max_delay_ms`.
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt. Signed so that a negative value in a
    /// config file is reported instead of failing to parse.
    pub max_attempts: i64,

    /// Delay strategy.
    pub strategy: BackoffStrategy,

    /// Base delay in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound for growing strategies, in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            strategy: BackoffStrategy::Constant,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            jitter: false,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per key per window.
    pub limit: u64,

    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            window_ms: 60_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::default();
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.retries.base_delay_ms, 500);
        assert_eq!(config.retries.strategy, BackoffStrategy::Constant);
        assert_eq!(config.rate_limit.limit, 5);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GuardConfig = toml::from_str(
            r#"
            [retries]
            strategy = "exponential"
            base_delay_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.retries.strategy, BackoffStrategy::Exponential);
        assert_eq!(config.retries.base_delay_ms, 1000);
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result: Result<GuardConfig, _> = toml::from_str(
            r#"
            [retries]
            strategy = "fibonacci"
            "#,
        );
        assert!(result.is_err());
    }
}
