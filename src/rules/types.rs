//! Match/action rule model.

use std::net::Ipv4Addr;

use crate::packet::MacAddr;
use crate::topology::{PortNo, SwitchId};

/// Match predicate for one flow rule. `None` fields are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowMatch {
    pub in_port: Option<PortNo>,
    pub eth_src: Option<MacAddr>,
    pub eth_dst: Option<MacAddr>,
    pub ipv4_src: Option<Ipv4Addr>,
    pub ipv4_dst: Option<Ipv4Addr>,
    pub ip_proto: Option<u8>,
    pub tp_src: Option<u16>,
    pub tp_dst: Option<u16>,
}

/// One rewrite or output step. Order matters: rewrites precede the output
/// they should apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetEthSrc(MacAddr),
    SetEthDst(MacAddr),
    SetIpv4Src(Ipv4Addr),
    SetIpv4Dst(Ipv4Addr),
    Output(PortNo),
}

/// A complete flow-mod for one switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRule {
    pub switch: SwitchId,
    pub fields: FlowMatch,
    pub actions: Vec<Action>,
    /// Must exceed the table-miss priority so the controller sees each flow
    /// exactly once.
    pub priority: u16,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
}
