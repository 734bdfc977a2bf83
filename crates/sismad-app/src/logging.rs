//! # Logging
//!
//! Tracing subscriber setup.
//!
//! ## Filter Precedence
//! 1. `RUST_LOG`
//! 2. `[logging] filter` from sismad.toml (or `SISMAD_LOG_FILTER`)
//! 3. [`DEFAULT_FILTER`]

use tracing_subscriber::EnvFilter;

/// Default directives: INFO everywhere, DEBUG for our crates, quiet sqlx.
pub const DEFAULT_FILTER: &str = "info,sismad=debug,sqlx=warn";

/// Builds the filter from the environment or the configured directives.
pub fn build_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        configured
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    })
}

/// Initializes the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=sismad_db=trace` - Show trace for the store only
///
/// Returns `false` if a subscriber was already installed (tests, embedding
/// hosts); the existing one is kept.
pub fn init_tracing(configured: Option<&str>) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(configured))
        .with_target(true)
        .try_init()
        .is_ok()
}
