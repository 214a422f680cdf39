//! Shared utilities for the integration suite.
#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use vip_balancer::channel::{SendError, SwitchCommand, SwitchConnection};
use vip_balancer::config::{parse_config, BalancerConfig};
use vip_balancer::packet::MacAddr;
use vip_balancer::rules::FlowRule;

/// The demo fabric: four backends on s1/s3, four clients on s5/s6.
pub const DEMO_CONFIG: &str = include_str!("../../config/vip-balancer.toml");

pub fn demo_config() -> BalancerConfig {
    parse_config(DEMO_CONFIG).expect("demo config must validate")
}

/// A switch connection that records every command it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    commands: Mutex<Vec<SwitchCommand>>,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn commands(&self) -> Vec<SwitchCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn installed_rules(&self) -> Vec<FlowRule> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                SwitchCommand::InstallRule(rule) => Some(rule),
                SwitchCommand::PacketOut { .. } => None,
            })
            .collect()
    }

    pub fn is_silent(&self) -> bool {
        self.commands.lock().unwrap().is_empty()
    }
}

impl SwitchConnection for RecordingConnection {
    fn send(&self, command: SwitchCommand) -> Result<(), SendError> {
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

pub fn mac(last: u8) -> MacAddr {
    MacAddr([0, 0, 0, 0, 0, last])
}

/// A minimal Ethernet+IPv4+TCP frame with the fields the engine reads.
pub fn tcp_frame(
    eth_src: MacAddr,
    eth_dst: MacAddr,
    src: Ipv4Addr,
    dst: Ipv4Addr,
    sport: u16,
    dport: u16,
) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&eth_dst.octets());
    frame.extend_from_slice(&eth_src.octets());
    frame.extend_from_slice(&0x0800u16.to_be_bytes());
    frame.push(0x45);
    frame.extend_from_slice(&[0; 8]);
    frame.push(6); // TCP
    frame.extend_from_slice(&[0, 0]);
    frame.extend_from_slice(&src.octets());
    frame.extend_from_slice(&dst.octets());
    frame.extend_from_slice(&sport.to_be_bytes());
    frame.extend_from_slice(&dport.to_be_bytes());
    frame
}

/// An ARP who-has request for `target_ip`.
pub fn arp_request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[0xff; 6]); // broadcast
    frame.extend_from_slice(&sender_mac.octets());
    frame.extend_from_slice(&0x0806u16.to_be_bytes());
    frame.extend_from_slice(&1u16.to_be_bytes()); // htype
    frame.extend_from_slice(&0x0800u16.to_be_bytes()); // ptype
    frame.push(6);
    frame.push(4);
    frame.extend_from_slice(&1u16.to_be_bytes()); // request
    frame.extend_from_slice(&sender_mac.octets());
    frame.extend_from_slice(&sender_ip.octets());
    frame.extend_from_slice(&[0; 6]); // unknown target MAC
    frame.extend_from_slice(&target_ip.octets());
    frame
}
