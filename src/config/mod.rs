//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, all errors collected)
//!     → GuardConfig (validated, immutable)
//!     → RetryPolicy / LimiterConfig built from their sections
//! ```
//!
//! # Design Decisions
//! - Every field has a default so an empty file is a valid config
//! - Serde handles syntax; validation.rs handles ranges
//! - The same range checks back the `RetryPolicy` and `LimiterConfig`
//!   constructors, so programmatic construction cannot bypass them

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BackoffStrategy, GuardConfig, ObservabilityConfig, RateLimitConfig, RetryConfig};
pub use validation::{validate_config, InvalidConfig};
