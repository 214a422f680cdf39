//! Backend selection subsystem.
//!
//! # Data Flow
//! ```text
//! PacketIn classified as VIP traffic
//!     → hasher.rs (FlowKey → canonical bytes → SHA-256 → index mod N)
//!     → backend.rs (fixed BackendSet, lookup by index)
//!     → chosen backend feeds path resolution and rule synthesis
//! ```
//!
//! # Design Decisions
//! - Selection is a pure, unkeyed digest: same key ⇒ same backend across
//!   processes and restarts, which is what lets independently restarted
//!   controllers agree on flow placement
//! - Changing the backend count reshuffles most keys; the set is fixed at
//!   startup, so no ring/rendezvous machinery is carried
//! - The backend set is immutable after startup; no health state is tracked

pub mod backend;
pub mod hasher;

pub use backend::{Backend, BackendSet};
pub use hasher::{AddressHasher, FlowKey};
