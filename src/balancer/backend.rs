//! The fixed backend set.
//!
//! # Responsibilities
//! - Represent one real server behind the virtual address
//! - Provide the ordered, immutable set the hasher indexes into
//! - Answer "is this source IP one of ours" for reverse traffic

use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::config::schema::BackendConfig;
use crate::packet::MacAddr;
use crate::topology::{PortNo, SwitchId};

/// One real server a virtual-address flow can be redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub name: String,
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    /// The switch this server attaches to (the backend-facing edge).
    pub switch: SwitchId,
    /// The port on that switch facing the server.
    pub port: PortNo,
    /// Position in the ordered set; what the hasher selects.
    pub index: usize,
}

/// The ordered backend set, fixed at startup.
#[derive(Debug, Clone)]
pub struct BackendSet {
    backends: Vec<Backend>,
    by_ip: HashMap<Ipv4Addr, usize>,
}

impl BackendSet {
    /// Build from validated configuration, preserving config order so the
    /// hash → index mapping is stable across restarts.
    pub fn from_config(configs: &[BackendConfig]) -> Self {
        let backends: Vec<Backend> = configs
            .iter()
            .enumerate()
            .map(|(index, cfg)| Backend {
                name: cfg.name.clone(),
                ip: cfg.ip,
                mac: cfg.mac,
                switch: cfg.switch.clone(),
                port: cfg.port,
                index,
            })
            .collect();
        let by_ip = backends.iter().map(|b| (b.ip, b.index)).collect();
        Self { backends, by_ip }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Backend> {
        self.backends.get(index)
    }

    /// The backend owning `ip` as its real address, if any. Used to spot
    /// return traffic that needs the un-NAT rule.
    pub fn by_source_ip(&self, ip: Ipv4Addr) -> Option<&Backend> {
        self.by_ip.get(&ip).and_then(|&i| self.backends.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Backend> {
        self.backends.iter()
    }
}
