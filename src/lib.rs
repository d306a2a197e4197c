//! Client-side resilience primitives.
//!
//! - [`resilience::RetryExecutor`] re-runs a failing operation under a
//!   [`resilience::RetryPolicy`] until it succeeds or the policy runs out.
//! - [`limiter::RateLimiter`] caps how many requests each key may make per
//!   fixed window.
//! - [`gate::Gate`] puts the two together for callers that want both.

pub mod config;
pub mod gate;
pub mod lifecycle;
pub mod limiter;
pub mod observability;
pub mod resilience;
pub mod time;

pub use config::schema::GuardConfig;
pub use gate::{Gate, GateError};
pub use limiter::{Admission, LimiterConfig, RateLimiter};
pub use resilience::{RetryError, RetryExecutor, RetryPolicy};
