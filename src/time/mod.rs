//! Time subsystem.
//!
//! # Data Flow
//! ```text
//! limiter (window bookkeeping)
//!     → clock.rs (Clock::now, monotonic Instant)
//!
//! resilience (delay between attempts)
//!     → sleeper.rs (Sleeper::sleep, suspends the calling task)
//! ```
//!
//! # Design Decisions
//! - Both primitives are injected, never reached through globals
//! - Production uses `SystemClock` + `TokioSleeper`
//! - Tests use `ManualClock` + `RecordingSleeper` for zero real waiting

pub mod clock;
pub mod sleeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
