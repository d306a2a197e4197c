//! Demonstration harness for the retry executor and rate limiter.
//!
//! Drives both primitives with synthetic traffic: a simulated flaky fetch and
//! a burst of requests for one user.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::Rng;
use thiserror::Error;

use request_guard::config::{load_config, GuardConfig};
use request_guard::lifecycle::{signals, Shutdown};
use request_guard::observability::logging;
use request_guard::{Gate, LimiterConfig, RateLimiter, RetryExecutor, RetryPolicy};

#[derive(Parser)]
#[command(name = "request-guard")]
#[command(
    about = "Drive the retry executor and rate limiter with synthetic traffic",
    long_about = None
)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a URL from a simulated flaky backend, retrying on failure
    Fetch {
        url: String,

        /// Probability that a single attempt succeeds
        #[arg(long, default_value_t = 0.5)]
        success_rate: f64,

        /// Simulated latency of each attempt in milliseconds
        #[arg(long, default_value_t = 300)]
        latency_ms: u64,
    },
    /// Send a burst of requests for one user through the rate limiter
    Limit {
        user: String,

        #[arg(short = 'n', long, default_value_t = 8)]
        requests: u32,
    },
    /// Rate-limited fetches: each request is admitted, then retried
    Guarded {
        user: String,
        url: String,

        #[arg(short = 'n', long, default_value_t = 3)]
        requests: u32,

        #[arg(long, default_value_t = 0.5)]
        success_rate: f64,

        #[arg(long, default_value_t = 300)]
        latency_ms: u64,
    },
}

#[derive(Debug, Error)]
#[error("Failed to fetch data from {url}")]
struct FetchError {
    url: String,
}

/// Pretend to fetch `url`, succeeding with probability `success_rate`.
async fn mock_fetch(url: &str, success_rate: f64, latency: Duration) -> Result<String, FetchError> {
    let success = rand::thread_rng().gen_bool(success_rate.clamp(0.0, 1.0));
    tokio::time::sleep(latency).await;

    if success {
        Ok(format!("Fetched data from {url}"))
    } else {
        Err(FetchError {
            url: url.to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };
    logging::init_logging(&config.observability)?;

    let policy = RetryPolicy::try_from(&config.retries)?;
    let limiter_config = LimiterConfig::try_from(&config.rate_limit)?;

    tracing::info!(
        max_attempts = policy.max_attempts(),
        strategy = ?config.retries.strategy,
        limit = limiter_config.limit(),
        window = ?limiter_config.window(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_ctrl_c(shutdown.clone()));

    let executor = RetryExecutor::default();

    match cli.command {
        Commands::Fetch {
            url,
            success_rate,
            latency_ms,
        } => {
            let latency = Duration::from_millis(latency_ms);
            let result = executor
                .execute_with(
                    &policy,
                    || mock_fetch(&url, success_rate, latency),
                    shutdown.cancelled(),
                    |failed| {
                        tracing::warn!(
                            attempt = failed.attempt,
                            error = %failed.error,
                            next_delay = ?failed.next_delay,
                            "Attempt failed"
                        );
                    },
                )
                .await;

            match result {
                Ok(data) => tracing::info!(%data, "Data fetched successfully"),
                Err(e) => tracing::error!(error = %e, "Final error after retries"),
            }
        }
        Commands::Limit { user, requests } => {
            let limiter = RateLimiter::from_config(limiter_config);
            for i in 1..=requests {
                let status = if limiter.is_allowed(&user) {
                    "allowed"
                } else {
                    "blocked"
                };
                tracing::info!(user = %user, request = i, status, "Request {}", status);
            }
        }
        Commands::Guarded {
            user,
            url,
            requests,
            success_rate,
            latency_ms,
        } => {
            let latency = Duration::from_millis(latency_ms);
            let gate = Gate::new(Arc::new(RateLimiter::from_config(limiter_config)), executor);

            for i in 1..=requests {
                let result = gate
                    .call_with(
                        &user,
                        &policy,
                        || mock_fetch(&url, success_rate, latency),
                        shutdown.cancelled(),
                        |failed| {
                            tracing::warn!(
                                request = i,
                                attempt = failed.attempt,
                                error = %failed.error,
                                "Attempt failed"
                            );
                        },
                    )
                    .await;

                match result {
                    Ok(data) => tracing::info!(request = i, %data, "Request succeeded"),
                    Err(e) => tracing::error!(request = i, error = %e, "Request failed"),
                }
                if shutdown.is_triggered() {
                    break;
                }
            }
        }
    }

    Ok(())
}
