//! Decision engine subsystem.
//!
//! # Data Flow
//! ```text
//! ControlEvent
//!     ConnectionUp → registry (switch id → connection handle)
//!     PacketIn → packet::parse → classify:
//!         ARP request for VIP → responder.rs → PacketOut reply on ingress port
//!         IPv4 → VIP          → hasher → path table → rule builder
//!                                 → installer (reverse first, then forward
//!                                   rules backend-edge first)
//!                                 → PacketOut the first packet itself
//!         IPv4 from backend   → reverse rule only (source fixes the backend)
//!         anything else       → silent no-op
//! ```
//!
//! # Design Decisions
//! - The engine is the only stateful component: it owns the connection
//!   registry and the responder's ownership binding, constructed at startup
//!   and discarded at shutdown
//! - Events are consumed one at a time from a single-consumer channel and
//!   each handler runs to completion, so no locking discipline is needed
//! - Degraded installs (missing connection, path gap) log and drop; the
//!   controller sees the flow again on its next packet

pub mod installer;
pub mod responder;

use std::net::Ipv4Addr;

use tokio::sync::{broadcast, mpsc};

use crate::balancer::{AddressHasher, BackendSet};
use crate::channel::{ConnectionRegistry, ControlEvent, SwitchCommand};
use crate::config::{BalancerConfig, OwnershipMode};
use crate::packet::arp::ARP_OP_REQUEST;
use crate::packet::{parse_frame, ArpFields, FramePayload, Ipv4Fields, MacAddr};
use crate::rules::{Action, FlowRuleBuilder};
use crate::topology::{PathTable, PortNo, SwitchId};

pub use installer::{InstallError, RuleInstaller};
pub use responder::{OwnershipPolicy, VirtualAddressResponder};

/// Top-level dispatcher for control-channel events.
#[derive(Debug)]
pub struct FlowDecisionEngine {
    vip: Ipv4Addr,
    backends: BackendSet,
    hasher: AddressHasher,
    paths: PathTable,
    builder: FlowRuleBuilder,
    installer: RuleInstaller,
    responder: VirtualAddressResponder,
    connections: ConnectionRegistry,
}

impl FlowDecisionEngine {
    /// Build the engine from a validated configuration.
    pub fn new(config: &BalancerConfig) -> Self {
        let policy = match (
            config.virtual_service.effective_ownership(),
            config.virtual_service.mac,
        ) {
            (OwnershipMode::Static, Some(mac)) => OwnershipPolicy::Static(mac),
            // Static without a MAC is rejected by validation; learn-first is
            // the only remaining meaning.
            _ => OwnershipPolicy::LearnFirst,
        };

        Self {
            vip: config.virtual_service.ip,
            backends: BackendSet::from_config(&config.backends),
            hasher: AddressHasher::new(config.hashing.include_source_port),
            paths: PathTable::from_config(config),
            builder: FlowRuleBuilder::new(config.virtual_service.ip, &config.rules),
            installer: RuleInstaller::new(),
            responder: VirtualAddressResponder::new(config.virtual_service.ip, policy),
            connections: ConnectionRegistry::new(),
        }
    }

    /// Dispatch one event to completion.
    pub fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::ConnectionUp { switch, connection } => {
                tracing::info!(switch = %switch, "switch connection registered");
                self.connections.register(switch, connection);
            }
            ControlEvent::PacketIn {
                switch,
                in_port,
                frame,
            } => self.handle_packet_in(&switch, in_port, &frame),
        }
    }

    /// The responder's current ownership binding, exposed for inspection.
    pub fn bound_vip_mac(&self) -> Option<MacAddr> {
        self.responder.bound_mac()
    }

    pub fn connected_switches(&self) -> usize {
        self.connections.len()
    }

    fn handle_packet_in(&mut self, switch: &SwitchId, in_port: PortNo, frame: &[u8]) {
        let parsed = match parse_frame(frame) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(switch = %switch, %error, "cannot classify packet, ignoring");
                return;
            }
        };

        match parsed.payload {
            FramePayload::Arp(arp) if arp.op == ARP_OP_REQUEST => {
                self.handle_arp_request(switch, in_port, arp)
            }
            FramePayload::Ipv4(ip) if ip.dst == self.vip => {
                self.handle_to_vip(switch, in_port, parsed.eth_src, parsed.eth_dst, ip, frame)
            }
            FramePayload::Ipv4(ip)
                if self.backends.by_source_ip(ip.src).is_some()
                    && self.paths.endpoint_for_ip(ip.dst).is_some() =>
            {
                self.handle_from_backend(ip)
            }
            _ => {
                tracing::trace!(switch = %switch, "uninteresting traffic, ignored");
            }
        }
    }

    fn handle_arp_request(&mut self, switch: &SwitchId, in_port: PortNo, arp: ArpFields) {
        let Some(reply) = self
            .responder
            .handle_request(arp.sender_mac, arp.sender_ip, arp.target_ip)
        else {
            tracing::trace!(target = %arp.target_ip, "resolution request for another address");
            return;
        };

        tracing::debug!(
            switch = %switch,
            requester = %reply.requester_ip,
            owner = %reply.owner_mac,
            "answering resolution request for virtual address"
        );
        self.forward_now(switch, reply.encode(), vec![Action::Output(in_port)]);
    }

    /// First packet of a (potential) new flow toward the virtual address:
    /// pick a backend, install both directions, then forward the packet
    /// itself so it is not lost while the rules land.
    fn handle_to_vip(
        &self,
        switch: &SwitchId,
        in_port: PortNo,
        eth_src: MacAddr,
        eth_dst: MacAddr,
        ip: Ipv4Fields,
        frame: &[u8],
    ) {
        let endpoint = self
            .paths
            .endpoint_for_ingress(switch, in_port)
            .or_else(|| self.paths.endpoint_for_ip(ip.src));
        let Some(endpoint) = endpoint else {
            tracing::warn!(
                switch = %switch,
                in_port,
                client = %ip.src,
                "virtual address traffic from unknown ingress, dropping"
            );
            return;
        };

        let key = self.hasher.key_for(&ip);
        let index = self.hasher.select(&key, self.backends.len());
        let Some(backend) = self.backends.get(index) else {
            return;
        };

        let path = match self.paths.resolve(&endpoint.name, &backend.name) {
            Ok(path) => path,
            Err(error) => {
                // Configuration gap, not a transient condition.
                tracing::error!(%error, "path table gap; flow stays on the controller");
                return;
            }
        };

        tracing::info!(
            client = %ip.src,
            endpoint = %endpoint.name,
            backend = %backend.name,
            hops = path.hops.len(),
            "selected backend for new flow"
        );

        // Reverse (un-NAT) rule first: it lives at the backend edge, the
        // furthest point from the ingress.
        let reverse =
            self.builder
                .reverse_rule(backend, endpoint, path, self.responder.bound_mac());
        if let Err(error) = self.installer.install(&self.connections, reverse) {
            tracing::warn!(%error, "reverse rule installation degraded");
        }

        let forward = self
            .builder
            .forward_rules(eth_src, eth_dst, &ip, in_port, backend, path);
        let out_actions = forward
            .iter()
            .find(|rule| &rule.switch == switch)
            .map(|rule| rule.actions.clone());

        self.installer.install_path(&self.connections, forward);

        match out_actions {
            Some(actions) => self.forward_now(switch, frame.to_vec(), actions),
            None => tracing::warn!(
                switch = %switch,
                "observed switch is not on the resolved path; first packet not forwarded"
            ),
        }
    }

    /// Return traffic observed before its un-NAT rule exists (e.g. after a
    /// rule expiry): the source already determines the owning backend, so
    /// only the reverse rule is reinstalled. No hashing involved.
    fn handle_from_backend(&self, ip: Ipv4Fields) {
        let Some(backend) = self.backends.by_source_ip(ip.src) else {
            return;
        };
        let Some(client) = self.paths.endpoint_for_ip(ip.dst) else {
            return;
        };

        let path = match self.paths.resolve(&client.name, &backend.name) {
            Ok(path) => path,
            Err(error) => {
                tracing::error!(%error, "path table gap on return traffic");
                return;
            }
        };

        tracing::debug!(
            backend = %backend.name,
            client = %client.name,
            "reinstalling un-NAT rule for return traffic"
        );
        let rule = self
            .builder
            .reverse_rule(backend, client, path, self.responder.bound_mac());
        if let Err(error) = self.installer.install(&self.connections, rule) {
            tracing::warn!(%error, "reverse rule installation degraded");
        }
    }

    /// Post a PacketOut to one switch, fire-and-forget.
    fn forward_now(&self, switch: &SwitchId, frame: Vec<u8>, actions: Vec<Action>) {
        let Some(connection) = self.connections.get(switch) else {
            tracing::warn!(switch = %switch, "no live connection for packet-out");
            return;
        };
        if let Err(error) = connection.send(SwitchCommand::PacketOut { frame, actions }) {
            tracing::warn!(switch = %switch, %error, "packet-out send failed");
        }
    }

    /// Consume events until shutdown. One event at a time, each handled to
    /// completion, which is what makes the lock-free state sound.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ControlEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            vip = %self.vip,
            backends = self.backends.len(),
            paths = self.paths.len(),
            "decision engine running"
        );
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("decision engine stopping");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        tracing::info!("all event producers dropped, stopping");
                        break;
                    }
                }
            }
        }
    }
}
