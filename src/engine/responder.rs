//! Address-resolution responder for the virtual address.
//!
//! # Responsibilities
//! - Answer ARP requests that target the virtual address
//! - Track which link-layer address currently claims ownership
//!
//! # Design Decisions
//! - Two policies: `Static` claims a configured MAC forever; `LearnFirst`
//!   binds to the first requester's announced MAC (first-writer-wins) as a
//!   bootstrap path for unconfigured environments
//! - Requests for other addresses are not this responder's concern: `None`,
//!   no logging above trace

use std::net::Ipv4Addr;

use crate::packet::arp::ArpReply;
use crate::packet::MacAddr;

/// Ownership policy for the virtual address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// Always claim this configured MAC.
    Static(MacAddr),
    /// Bind to the first requester's MAC; never reassigned afterwards.
    LearnFirst,
}

/// Answers resolution requests for the virtual address on behalf of whoever
/// currently owns it.
#[derive(Debug)]
pub struct VirtualAddressResponder {
    vip: Ipv4Addr,
    policy: OwnershipPolicy,
    learned: Option<MacAddr>,
}

impl VirtualAddressResponder {
    pub fn new(vip: Ipv4Addr, policy: OwnershipPolicy) -> Self {
        Self {
            vip,
            policy,
            learned: None,
        }
    }

    /// The MAC currently bound to the virtual address, if any.
    pub fn bound_mac(&self) -> Option<MacAddr> {
        match self.policy {
            OwnershipPolicy::Static(mac) => Some(mac),
            OwnershipPolicy::LearnFirst => self.learned,
        }
    }

    /// Handle one resolution request. Returns the reply to send, or `None`
    /// when the request does not target the virtual address.
    pub fn handle_request(
        &mut self,
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_ip: Ipv4Addr,
    ) -> Option<ArpReply> {
        if target_ip != self.vip {
            return None;
        }

        if self.policy == OwnershipPolicy::LearnFirst && self.learned.is_none() {
            tracing::info!(
                vip = %self.vip,
                owner = %sender_mac,
                "learned virtual address owner from first resolution request"
            );
            self.learned = Some(sender_mac);
        }

        let owner_mac = self.bound_mac()?;
        Some(ArpReply {
            owner_mac,
            owner_ip: self.vip,
            requester_mac: sender_mac,
            requester_ip: sender_ip,
        })
    }
}
