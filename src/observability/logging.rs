//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem once at startup
//! - Configure the log filter from config, overridable via RUST_LOG
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging; decision-path lines
//!   carry fields (switch, client, backend) rather than formatted prose
//! - RUST_LOG wins over the configured level so operators can turn up
//!   verbosity without touching config files

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Call once, before any engine activity.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
