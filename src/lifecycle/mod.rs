//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every Shutdown::cancelled() future resolves
//!             → pending retry waits end with RetryError::Cancelled
//! ```
//!
//! # Design Decisions
//! - Cancellation is a plain future, so the executor does not depend on this
//!   module
//! - A trigger that happens before a subscriber arrives is not lost

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
