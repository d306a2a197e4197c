//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller operation:
//!     → retries.rs (invoke, on failure count the attempt)
//!     → backoff.rs (delay derived from failures so far)
//!     → time::Sleeper (suspend, racing an optional cancellation signal)
//!     → loop, or surface RetriesExhausted / Cancelled
//! ```
//!
//! # Design Decisions
//! - The executor owns no state across calls; each call gets a fresh counter
//! - Only the final outcome crosses the boundary; intermediate failures go to
//!   an optional observer
//! - Cancellation is cooperative and only observed while waiting

pub mod backoff;
pub mod retries;

pub use backoff::Backoff;
pub use retries::{FailedAttempt, RetryError, RetryExecutor, RetryPolicy};
