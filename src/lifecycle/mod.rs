//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build engine → Spawn event loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → engine loop drains and exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error (config gap, empty backend set) is fatal
//! - Shutdown is a broadcast; the engine loop finishes its current event
//!   before exiting, preserving run-to-completion semantics

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
