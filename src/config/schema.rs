//! Configuration schema definitions.
//!
//! This module defines the complete startup configuration for the balancer.
//! All types derive Serde traits for deserialization from TOML.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::packet::MacAddr;
use crate::topology::{Hop, PortNo, SwitchId};

/// Root configuration for the decision core.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalancerConfig {
    /// The published virtual service address.
    pub virtual_service: VirtualServiceConfig,

    /// Ordered backend set; order fixes the hash → backend mapping.
    pub backends: Vec<BackendConfig>,

    /// Client attachment points.
    pub endpoints: Vec<EndpointConfig>,

    /// Static path table entries.
    pub paths: Vec<PathConfig>,

    /// Flow-rule knobs (priority, timeouts).
    #[serde(default)]
    pub rules: RuleConfig,

    /// Flow-key granularity.
    #[serde(default)]
    pub hashing: HashConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// How the virtual address answers resolution requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipMode {
    /// Always claim the configured MAC.
    Static,
    /// Bind to the first requester's MAC, first-writer-wins.
    LearnFirst,
}

/// The virtual service address and its link-layer identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VirtualServiceConfig {
    /// The published network address clients target.
    pub ip: Ipv4Addr,

    /// Link-layer address to claim in resolution replies. Optional; when
    /// absent it is learned from the first request (`learn-first`).
    pub mac: Option<MacAddr>,

    /// Explicit policy override; defaults from whether `mac` is set.
    pub ownership: Option<OwnershipMode>,
}

impl VirtualServiceConfig {
    /// The policy actually in force once defaults resolve.
    pub fn effective_ownership(&self) -> OwnershipMode {
        match self.ownership {
            Some(mode) => mode,
            None if self.mac.is_some() => OwnershipMode::Static,
            None => OwnershipMode::LearnFirst,
        }
    }
}

/// One real server behind the virtual address.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend identifier ("h1", ...).
    pub name: String,

    /// Real network address.
    pub ip: Ipv4Addr,

    /// Real link-layer address, rewritten in at the final forward hop.
    pub mac: MacAddr,

    /// Attachment switch (the backend-facing edge).
    pub switch: SwitchId,

    /// Port on that switch facing the server.
    pub port: PortNo,
}

/// One client attachment point.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Unique endpoint identifier ("h5", ...).
    pub name: String,

    /// The client host's address, used to recognize known clients.
    pub ip: Ipv4Addr,

    /// Attachment switch.
    pub switch: SwitchId,

    /// Port on that switch facing the host.
    pub port: PortNo,
}

/// One path-table entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathConfig {
    /// Endpoint name this entry starts from.
    pub endpoint: String,

    /// Backend name this entry leads to.
    pub backend: String,

    /// Ordered hops, client edge first.
    pub hops: Vec<Hop>,

    /// Port at the backend-edge switch leading back toward this client.
    pub return_port: PortNo,
}

/// Flow-rule knobs. Defaults: priority above a zero-priority table-miss rule,
/// a short idle timeout to reclaim flow-table space, a bounded hard ceiling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleConfig {
    pub priority: u16,
    pub idle_timeout_secs: u16,
    pub hard_timeout_secs: u16,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            priority: 100,
            idle_timeout_secs: 10,
            hard_timeout_secs: 30,
        }
    }
}

/// Flow-key granularity.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HashConfig {
    /// Hash the source transport port too, for per-connection stickiness.
    pub include_source_port: bool,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
