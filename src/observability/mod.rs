//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Consumers:
//!     → stdout (pretty/compact fmt layer), filtered by RUST_LOG or config
//! ```
//!
//! # Design Decisions
//! - Logging is the whole observability surface of the decision core; the
//!   control-channel runtime owns its own transport metrics
//! - Degraded operation (missing connection, path gap) is a warn/error log,
//!   never a crash

pub mod logging;

pub use logging::init_logging;
