//! Flow-rule subsystem.
//!
//! # Data Flow
//! ```text
//! chosen backend + resolved path + observed packet fields
//!     → builder.rs
//!         forward: per-hop rules (interior = steer, final hop = DNAT + steer)
//!         reverse: one un-NAT rule at the backend-facing edge switch
//!     → types.rs (FlowMatch / Action / FlowRule, plain data)
//!     → installer dispatches each rule to its switch connection
//! ```
//!
//! # Design Decisions
//! - Address translation happens exactly once per direction, at the edges;
//!   interior hops only steer. Interior switches therefore never match on
//!   rewritten fields
//! - Matches carry the exact observed 5-tuple so a rule can never capture an
//!   unrelated flow
//! - Rules are fire-and-forget: no installed-state tracking, reinstallation
//!   on the next first-packet is idempotent because switches overwrite
//!   matching entries

pub mod builder;
pub mod types;

pub use builder::FlowRuleBuilder;
pub use types::{Action, FlowMatch, FlowRule};
