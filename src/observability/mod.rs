//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! limiter, gate, demo harness produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via `metrics`)
//! ```
//!
//! # Design Decisions
//! - The retry executor itself neither logs nor records; its callers do
//! - Metric updates are no-ops until the application installs a recorder
//! - Log level configurable via config, overridden by RUST_LOG

pub mod logging;
pub mod metrics;
