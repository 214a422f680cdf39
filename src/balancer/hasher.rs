//! Deterministic backend selection from a flow key.

use std::net::Ipv4Addr;

use sha2::{Digest, Sha256};

use crate::packet::Ipv4Fields;

/// The subset of the 5-tuple that sticks a flow to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    /// Present only when per-connection stickiness is configured.
    pub src_port: Option<u16>,
}

impl FlowKey {
    /// Canonical byte serialization: `src:dst` or `src:dst:sport`, UTF-8.
    /// Field order is fixed; two processes building the same key produce
    /// identical bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self.src_port {
            Some(port) => format!("{}:{}:{}", self.src, self.dst, port).into_bytes(),
            None => format!("{}:{}", self.src, self.dst).into_bytes(),
        }
    }
}

/// Maps a flow key to a backend index via an unkeyed cryptographic digest.
#[derive(Debug, Clone, Copy)]
pub struct AddressHasher {
    include_source_port: bool,
}

impl AddressHasher {
    pub fn new(include_source_port: bool) -> Self {
        Self { include_source_port }
    }

    /// Build the flow key for an observed packet, honoring the configured
    /// granularity.
    pub fn key_for(&self, ip: &Ipv4Fields) -> FlowKey {
        FlowKey {
            src: ip.src,
            dst: ip.dst,
            src_port: if self.include_source_port {
                ip.src_port
            } else {
                None
            },
        }
    }

    /// Select a backend index in `[0, backend_count)`.
    ///
    /// # Panics
    ///
    /// Panics if `backend_count` is zero. Startup validation refuses an
    /// empty backend set, so a live engine can never hit this.
    pub fn select(&self, key: &FlowKey, backend_count: usize) -> usize {
        assert!(backend_count > 0, "backend set must be non-empty");

        let digest = Sha256::digest(key.canonical_bytes());
        let mut high = [0u8; 16];
        high.copy_from_slice(&digest[..16]);
        (u128::from_be_bytes(high) % backend_count as u128) as usize
    }
}
