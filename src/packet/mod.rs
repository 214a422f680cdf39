//! Packet parsing subsystem.
//!
//! # Data Flow
//! ```text
//! Raw frame bytes (from PacketIn event)
//!     → parse.rs (header extraction: Ethernet → ARP | IPv4 → TCP/UDP)
//!     → ParsedFrame (typed field view)
//!     → engine classification (ARP request / VIP traffic / backend return)
//!
//! ARP reply synthesis:
//!     responder decision → arp.rs (encode 42-byte reply frame) → PacketOut
//! ```
//!
//! # Design Decisions
//! - Parse only the fields classification needs; deeper payloads stay opaque
//! - Truncated or unknown frames return an error, never panic
//! - Field structs are Copy so the engine can classify without borrows

pub mod arp;
pub mod parse;
pub mod types;

pub use arp::ArpReply;
pub use parse::{parse_frame, PacketError};
pub use types::{ArpFields, FramePayload, Ipv4Fields, MacAddr, ParsedFrame};
