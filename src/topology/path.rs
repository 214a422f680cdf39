//! Path table: static (endpoint, backend) → hop-sequence lookup.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An OpenFlow-style switch port number.
pub type PortNo = u16;

/// Identifier of one switch on the control channel ("s1", "s5", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchId(pub String);

impl SwitchId {
    pub fn new(id: impl Into<String>) -> Self {
        SwitchId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SwitchId {
    fn from(s: &str) -> Self {
        SwitchId(s.to_string())
    }
}

/// One switch traversed along a path, with the egress port to use there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub switch: SwitchId,
    pub out_port: PortNo,
}

/// A host-facing attachment point (a client host and where it plugs in).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEndpoint {
    pub name: String,
    pub ip: Ipv4Addr,
    pub switch: SwitchId,
    pub port: PortNo,
}

/// The hop sequence for one (endpoint, backend) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Ordered client-edge → backend-edge.
    pub hops: Vec<Hop>,
    /// Port at the backend-edge switch leading back toward this client.
    pub return_port: PortNo,
}

impl PathEntry {
    /// The backend-facing edge switch (last hop). Validation guarantees the
    /// hop list is non-empty for every entry that reaches the table.
    pub fn edge_switch(&self) -> Option<&SwitchId> {
        self.hops.last().map(|hop| &hop.switch)
    }
}

/// Raised when a pair has no configured path: a configuration gap, reported
/// loudly, and never a reason to install anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no path configured from endpoint '{endpoint}' to backend '{backend}'")]
pub struct NoPathError {
    pub endpoint: String,
    pub backend: String,
}

/// Read-only lookup from (endpoint, backend) to a hop sequence, plus the
/// endpoint lookups the engine needs to classify traffic.
#[derive(Debug, Clone)]
pub struct PathTable {
    endpoints: Vec<TopologyEndpoint>,
    paths: HashMap<(String, String), PathEntry>,
}

impl PathTable {
    /// Build from validated configuration.
    pub fn from_config(config: &crate::config::BalancerConfig) -> Self {
        let endpoints = config
            .endpoints
            .iter()
            .map(|ep| TopologyEndpoint {
                name: ep.name.clone(),
                ip: ep.ip,
                switch: ep.switch.clone(),
                port: ep.port,
            })
            .collect();
        let paths = config
            .paths
            .iter()
            .map(|p| {
                (
                    (p.endpoint.clone(), p.backend.clone()),
                    PathEntry {
                        hops: p.hops.clone(),
                        return_port: p.return_port,
                    },
                )
            })
            .collect();
        Self { endpoints, paths }
    }

    pub fn new(
        endpoints: Vec<TopologyEndpoint>,
        paths: HashMap<(String, String), PathEntry>,
    ) -> Self {
        Self { endpoints, paths }
    }

    /// Resolve the hop sequence from `endpoint` to `backend`.
    pub fn resolve(&self, endpoint: &str, backend: &str) -> Result<&PathEntry, NoPathError> {
        self.paths
            .get(&(endpoint.to_string(), backend.to_string()))
            .ok_or_else(|| NoPathError {
                endpoint: endpoint.to_string(),
                backend: backend.to_string(),
            })
    }

    /// The endpoint a client IP belongs to, if it is a configured client.
    pub fn endpoint_for_ip(&self, ip: Ipv4Addr) -> Option<&TopologyEndpoint> {
        self.endpoints.iter().find(|ep| ep.ip == ip)
    }

    /// The endpoint attached at (switch, port), if any.
    pub fn endpoint_for_ingress(&self, switch: &SwitchId, port: PortNo) -> Option<&TopologyEndpoint> {
        self.endpoints
            .iter()
            .find(|ep| &ep.switch == switch && ep.port == port)
    }

    pub fn endpoints(&self) -> &[TopologyEndpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
