//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, all errors collected)
//!     → BalancerConfig (validated, immutable)
//!     → engine/topology/hasher built from it at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the topology and backend set are fixed
//!   for the process lifetime, so there is no reload path
//! - Rule knobs and hashing granularity default so a minimal config works
//! - Validation separates syntactic (serde) from semantic checks and fails
//!   startup on any gap the engine would otherwise hit per-packet

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackendConfig, BalancerConfig, EndpointConfig, HashConfig, ObservabilityConfig, OwnershipMode,
    PathConfig, RuleConfig, VirtualServiceConfig,
};
pub use validation::{validate_config, ValidationError};
