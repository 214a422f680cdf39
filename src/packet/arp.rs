//! ARP reply synthesis for the virtual address.
//!
//! # Responsibilities
//! - Encode the resolution reply the responder decides to send
//! - Keep wire-format knowledge out of the decision engine

use std::net::Ipv4Addr;

use crate::packet::types::{MacAddr, ETHERTYPE_ARP, ETHERTYPE_IPV4};

pub const ARP_OP_REQUEST: u16 = 1;
pub const ARP_OP_REPLY: u16 = 2;

/// A fully-decided ARP reply, ready to encode and send out the ingress port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpReply {
    /// The link-layer address claiming ownership of the virtual address.
    pub owner_mac: MacAddr,
    /// The virtual address being resolved.
    pub owner_ip: Ipv4Addr,
    /// The requester the reply is addressed to.
    pub requester_mac: MacAddr,
    pub requester_ip: Ipv4Addr,
}

impl ArpReply {
    /// Encode as a 42-byte Ethernet + ARP frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(42);

        // Ethernet header
        frame.extend_from_slice(&self.requester_mac.octets());
        frame.extend_from_slice(&self.owner_mac.octets());
        frame.extend_from_slice(&ETHERTYPE_ARP.to_be_bytes());

        // ARP payload (Ethernet/IPv4)
        frame.extend_from_slice(&1u16.to_be_bytes()); // htype
        frame.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes()); // ptype
        frame.push(6); // hlen
        frame.push(4); // plen
        frame.extend_from_slice(&ARP_OP_REPLY.to_be_bytes());
        frame.extend_from_slice(&self.owner_mac.octets());
        frame.extend_from_slice(&self.owner_ip.octets());
        frame.extend_from_slice(&self.requester_mac.octets());
        frame.extend_from_slice(&self.requester_ip.octets());

        frame
    }
}
