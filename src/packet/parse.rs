//! Raw-frame header extraction.
//!
//! # Responsibilities
//! - Extract Ethernet, ARP, IPv4 and TCP/UDP header fields from raw bytes
//! - Report truncation and malformed headers as errors, never panic
//!
//! # Design Decisions
//! - Offset-based reads against a length-checked slice; no unsafe
//! - Frames with an unknown ethertype parse successfully as `Other` so the
//!   engine can ignore them silently rather than log a parse warning

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::packet::types::{
    ArpFields, FramePayload, Ipv4Fields, MacAddr, ParsedFrame, ETHERTYPE_ARP, ETHERTYPE_IPV4,
    IPPROTO_TCP, IPPROTO_UDP,
};

const ETH_HEADER_LEN: usize = 14;
const ARP_IPV4_LEN: usize = 28;
const IPV4_MIN_HEADER_LEN: usize = 20;

/// Errors produced while extracting headers from a raw frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("frame truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("unsupported ARP hardware/protocol combination")]
    UnsupportedArp,

    #[error("bad IPv4 header: {0}")]
    BadIpv4(&'static str),
}

/// Parse a raw Ethernet frame far enough to classify it.
pub fn parse_frame(bytes: &[u8]) -> Result<ParsedFrame, PacketError> {
    if bytes.len() < ETH_HEADER_LEN {
        return Err(PacketError::Truncated {
            need: ETH_HEADER_LEN,
            have: bytes.len(),
        });
    }

    let eth_dst = MacAddr(read_mac(bytes, 0));
    let eth_src = MacAddr(read_mac(bytes, 6));
    let ethertype = u16::from_be_bytes([bytes[12], bytes[13]]);
    let rest = &bytes[ETH_HEADER_LEN..];

    let payload = match ethertype {
        ETHERTYPE_ARP => FramePayload::Arp(parse_arp(rest)?),
        ETHERTYPE_IPV4 => FramePayload::Ipv4(parse_ipv4(rest)?),
        other => FramePayload::Other(other),
    };

    Ok(ParsedFrame {
        eth_src,
        eth_dst,
        payload,
    })
}

fn parse_arp(bytes: &[u8]) -> Result<ArpFields, PacketError> {
    if bytes.len() < ARP_IPV4_LEN {
        return Err(PacketError::Truncated {
            need: ARP_IPV4_LEN,
            have: bytes.len(),
        });
    }

    let htype = u16::from_be_bytes([bytes[0], bytes[1]]);
    let ptype = u16::from_be_bytes([bytes[2], bytes[3]]);
    let hlen = bytes[4];
    let plen = bytes[5];
    // Only Ethernet/IPv4 ARP is meaningful here.
    if htype != 1 || ptype != ETHERTYPE_IPV4 || hlen != 6 || plen != 4 {
        return Err(PacketError::UnsupportedArp);
    }

    Ok(ArpFields {
        op: u16::from_be_bytes([bytes[6], bytes[7]]),
        sender_mac: MacAddr(read_mac(bytes, 8)),
        sender_ip: read_ipv4(bytes, 14),
        target_mac: MacAddr(read_mac(bytes, 18)),
        target_ip: read_ipv4(bytes, 24),
    })
}

fn parse_ipv4(bytes: &[u8]) -> Result<Ipv4Fields, PacketError> {
    if bytes.len() < IPV4_MIN_HEADER_LEN {
        return Err(PacketError::Truncated {
            need: IPV4_MIN_HEADER_LEN,
            have: bytes.len(),
        });
    }

    let version = bytes[0] >> 4;
    if version != 4 {
        return Err(PacketError::BadIpv4("version field is not 4"));
    }
    let header_len = usize::from(bytes[0] & 0x0f) * 4;
    if header_len < IPV4_MIN_HEADER_LEN {
        return Err(PacketError::BadIpv4("header length below minimum"));
    }
    if bytes.len() < header_len {
        return Err(PacketError::Truncated {
            need: header_len,
            have: bytes.len(),
        });
    }

    let protocol = bytes[9];
    let src = read_ipv4(bytes, 12);
    let dst = read_ipv4(bytes, 16);

    // Ports only exist for TCP/UDP, and only if the transport header made it
    // into the buffer; a VIP flow with a truncated transport header still
    // classifies, it just hashes without the port.
    let (src_port, dst_port) = match protocol {
        IPPROTO_TCP | IPPROTO_UDP if bytes.len() >= header_len + 4 => {
            let l4 = &bytes[header_len..];
            (
                Some(u16::from_be_bytes([l4[0], l4[1]])),
                Some(u16::from_be_bytes([l4[2], l4[3]])),
            )
        }
        _ => (None, None),
    };

    Ok(Ipv4Fields {
        src,
        dst,
        protocol,
        src_port,
        dst_port,
    })
}

fn read_mac(bytes: &[u8], offset: usize) -> [u8; 6] {
    let mut mac = [0u8; 6];
    mac.copy_from_slice(&bytes[offset..offset + 6]);
    mac
}

fn read_ipv4(bytes: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    )
}
