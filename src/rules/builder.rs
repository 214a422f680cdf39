//! Forward/reverse rule synthesis for one selected flow.

use crate::balancer::Backend;
use crate::config::schema::RuleConfig;
use crate::packet::{Ipv4Fields, MacAddr};
use crate::rules::types::{Action, FlowMatch, FlowRule};
use crate::topology::{PathEntry, PortNo, TopologyEndpoint};
use std::net::Ipv4Addr;

/// Synthesizes the rule sets that make a flow bypass the controller.
#[derive(Debug, Clone)]
pub struct FlowRuleBuilder {
    vip: Ipv4Addr,
    priority: u16,
    idle_timeout: u16,
    hard_timeout: u16,
}

impl FlowRuleBuilder {
    pub fn new(vip: Ipv4Addr, rules: &RuleConfig) -> Self {
        Self {
            vip,
            priority: rules.priority,
            idle_timeout: rules.idle_timeout_secs,
            hard_timeout: rules.hard_timeout_secs,
        }
    }

    /// One rule per hop, client-edge first (the caller installs them in the
    /// opposite order). Interior hops steer only; the final hop rewrites the
    /// destination to the real backend before output, so interior matches
    /// still see the virtual address.
    pub fn forward_rules(
        &self,
        eth_src: MacAddr,
        eth_dst: MacAddr,
        ip: &Ipv4Fields,
        in_port: PortNo,
        backend: &Backend,
        path: &PathEntry,
    ) -> Vec<FlowRule> {
        let last = path.hops.len().saturating_sub(1);
        path.hops
            .iter()
            .enumerate()
            .map(|(i, hop)| {
                let fields = FlowMatch {
                    // The ingress port is only known at the observation hop.
                    in_port: (i == 0).then_some(in_port),
                    eth_src: Some(eth_src),
                    eth_dst: Some(eth_dst),
                    ipv4_src: Some(ip.src),
                    ipv4_dst: Some(ip.dst),
                    ip_proto: Some(ip.protocol),
                    tp_src: ip.src_port,
                    tp_dst: ip.dst_port,
                };
                let actions = if i == last {
                    vec![
                        Action::SetIpv4Dst(backend.ip),
                        Action::SetEthDst(backend.mac),
                        Action::Output(hop.out_port),
                    ]
                } else {
                    vec![Action::Output(hop.out_port)]
                };
                FlowRule {
                    switch: hop.switch.clone(),
                    fields,
                    actions,
                    priority: self.priority,
                    idle_timeout: self.idle_timeout,
                    hard_timeout: self.hard_timeout,
                }
            })
            .collect()
    }

    /// The single un-NAT rule at the backend-facing edge switch: return
    /// traffic for this client leaves claiming the virtual address, so the
    /// client never observes a real backend address. The MAC rewrite is
    /// skipped while no ownership binding exists yet.
    pub fn reverse_rule(
        &self,
        backend: &Backend,
        client: &TopologyEndpoint,
        path: &PathEntry,
        vip_mac: Option<MacAddr>,
    ) -> FlowRule {
        let switch = path
            .edge_switch()
            .cloned()
            .unwrap_or_else(|| backend.switch.clone());

        let mut actions = vec![Action::SetIpv4Src(self.vip)];
        if let Some(mac) = vip_mac {
            actions.push(Action::SetEthSrc(mac));
        }
        actions.push(Action::Output(path.return_port));

        FlowRule {
            switch,
            fields: FlowMatch {
                ipv4_src: Some(backend.ip),
                ipv4_dst: Some(client.ip),
                ..FlowMatch::default()
            },
            actions,
            priority: self.priority,
            idle_timeout: self.idle_timeout,
            hard_timeout: self.hard_timeout,
        }
    }
}
