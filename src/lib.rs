//! Decision core of an SDN load balancer.
//!
//! Given a packet observed at a switch, the engine deterministically selects
//! a backend for the virtual service address, resolves the static hop
//! sequence to it, synthesizes forward/reverse flow rules for every hop, and
//! hands them to the control-channel runtime so later packets of the flow
//! stay on the hardware fast path. It also answers ARP for the virtual
//! address on behalf of its current owner.

// Core subsystems
pub mod balancer;
pub mod channel;
pub mod config;
pub mod engine;
pub mod packet;
pub mod rules;
pub mod topology;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use channel::{ControlEvent, ControllerHandle, SwitchCommand, SwitchConnection};
pub use config::BalancerConfig;
pub use engine::FlowDecisionEngine;
pub use lifecycle::Shutdown;
