//! Static topology subsystem.
//!
//! # Data Flow
//! ```text
//! config (endpoints + path entries, validated)
//!     → path.rs (PathTable: (endpoint, backend) → ordered hops)
//!     → engine resolves ingress → endpoint, endpoint → hop sequence
//! ```
//!
//! # Design Decisions
//! - The table is built once at startup and read-only afterwards
//! - A missing (endpoint, backend) pair is NoPathError, never a panic;
//!   startup validation guarantees it cannot happen with a valid config
//! - Per-host conditionals from the ancestry of this design are strictly a
//!   degenerate case of the table and are not reproduced

pub mod path;

pub use path::{Hop, NoPathError, PathEntry, PathTable, PortNo, SwitchId, TopologyEndpoint};
