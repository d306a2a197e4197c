//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (ctrl-c)
//! - Translate it into a shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A failed listener is logged, not fatal

use crate::lifecycle::Shutdown;

/// Wait for ctrl-c, then trigger `shutdown`.
pub async fn shutdown_on_ctrl_c(shutdown: Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Interrupt received, cancelling pending retries");
            shutdown.trigger();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for interrupt signal");
        }
    }
}
