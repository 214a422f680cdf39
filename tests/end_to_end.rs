//! End-to-end scenarios: events in, rules and packet-outs observed at mock
//! switch connections.

mod common;

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use common::{arp_request, demo_config, mac, tcp_frame, RecordingConnection};
use vip_balancer::channel::{ControlEvent, SwitchCommand};
use vip_balancer::engine::FlowDecisionEngine;
use vip_balancer::packet::{parse_frame, FramePayload, MacAddr};
use vip_balancer::rules::Action;
use vip_balancer::topology::SwitchId;

const VIP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 100);
const VIP_MAC_LAST: u8 = 0xfe;

struct Harness {
    engine: FlowDecisionEngine,
    switches: HashMap<&'static str, Arc<RecordingConnection>>,
}

impl Harness {
    /// Engine over the demo fabric with live connections to `connected`.
    fn new(connected: &[&'static str]) -> Self {
        let mut engine = FlowDecisionEngine::new(&demo_config());
        let mut switches = HashMap::new();
        for &name in connected {
            let connection = RecordingConnection::new();
            engine.handle_event(ControlEvent::ConnectionUp {
                switch: SwitchId::from(name),
                connection: connection.clone(),
            });
            switches.insert(name, connection);
        }
        Self { engine, switches }
    }

    fn all() -> Self {
        Self::new(&["s1", "s2", "s3", "s4", "s5", "s6"])
    }

    fn packet_in(&mut self, switch: &str, in_port: u16, frame: Vec<u8>) {
        self.engine.handle_event(ControlEvent::PacketIn {
            switch: SwitchId::from(switch),
            in_port,
            frame,
        });
    }

    fn conn(&self, switch: &str) -> &RecordingConnection {
        self.switches[switch].as_ref()
    }
}

/// Scenario: first packet from h5 to the VIP. The flow key
/// `10.0.0.5:10.0.0.100` digests to index 2 of 4, so h3 is selected and the
/// configured h5 -> h3 path (s5, s2, s4, s3) is installed in both directions.
#[test]
fn first_packet_installs_both_directions_along_hashed_path() {
    let mut harness = Harness::all();
    let frame = tcp_frame(mac(5), mac(VIP_MAC_LAST), Ipv4Addr::new(10, 0, 0, 5), VIP, 40000, 80);
    harness.packet_in("s5", 1, frame.clone());

    // Backend edge (s3): un-NAT rule first, then the rewriting forward hop.
    let s3 = harness.conn("s3").installed_rules();
    assert_eq!(s3.len(), 2);

    let reverse = &s3[0];
    assert_eq!(reverse.fields.ipv4_src, Some(Ipv4Addr::new(10, 0, 0, 3)));
    assert_eq!(reverse.fields.ipv4_dst, Some(Ipv4Addr::new(10, 0, 0, 5)));
    assert_eq!(
        reverse.actions,
        vec![
            Action::SetIpv4Src(VIP),
            Action::SetEthSrc(mac(VIP_MAC_LAST)),
            Action::Output(4),
        ]
    );

    let last_forward = &s3[1];
    assert_eq!(
        last_forward.actions,
        vec![
            Action::SetIpv4Dst(Ipv4Addr::new(10, 0, 0, 3)),
            Action::SetEthDst(mac(3)),
            Action::Output(1),
        ]
    );
    // Matches carry the observed tuple, pre-rewrite.
    assert_eq!(last_forward.fields.ipv4_dst, Some(VIP));
    assert_eq!(last_forward.fields.tp_src, Some(40000));
    assert_eq!(last_forward.fields.tp_dst, Some(80));

    // Interior hops steer without rewriting.
    for switch in ["s2", "s4"] {
        let rules = harness.conn(switch).installed_rules();
        assert_eq!(rules.len(), 1, "{switch} should hold one steering rule");
        assert!(matches!(rules[0].actions[..], [Action::Output(_)]));
        assert_eq!(rules[0].fields.in_port, None);
    }

    // Ingress hop matches the observed port and also forwards the first
    // packet immediately.
    let s5 = harness.conn("s5").commands();
    assert_eq!(s5.len(), 2);
    match &s5[0] {
        SwitchCommand::InstallRule(rule) => {
            assert_eq!(rule.fields.in_port, Some(1));
            assert_eq!(rule.actions, vec![Action::Output(3)]);
        }
        other => panic!("expected ingress install first, got {:?}", other),
    }
    match &s5[1] {
        SwitchCommand::PacketOut { frame: sent, actions } => {
            assert_eq!(sent, &frame);
            assert_eq!(actions, &vec![Action::Output(3)]);
        }
        other => panic!("expected packet-out after install, got {:?}", other),
    }
}

/// Same key, fresh engine: the selection and the installed path are
/// identical, which is what lets a restarted controller agree with itself.
#[test]
fn selection_is_stable_across_engine_restarts() {
    let observe = || {
        let mut harness = Harness::all();
        let frame =
            tcp_frame(mac(5), mac(VIP_MAC_LAST), Ipv4Addr::new(10, 0, 0, 5), VIP, 40000, 80);
        harness.packet_in("s5", 1, frame);
        harness.conn("s3").installed_rules()
    };
    assert_eq!(observe(), observe());
}

/// A VIP packet from a source that is not a configured client endpoint:
/// nothing resolves, nothing installs, nothing panics.
#[test]
fn unknown_client_installs_nothing() {
    let mut harness = Harness::all();
    let frame = tcp_frame(
        mac(9),
        mac(VIP_MAC_LAST),
        Ipv4Addr::new(192, 168, 1, 9),
        VIP,
        40000,
        80,
    );
    harness.packet_in("s5", 7, frame);

    for switch in ["s1", "s2", "s3", "s4", "s5", "s6"] {
        assert!(harness.conn(switch).is_silent(), "{switch} should be silent");
    }
}

/// Only the ingress switch is connected: the reachable hop still installs
/// and the first packet still goes out; the rest degrade to warnings.
#[test]
fn partial_connectivity_degrades_instead_of_failing() {
    let mut harness = Harness::new(&["s5"]);
    let frame = tcp_frame(mac(5), mac(VIP_MAC_LAST), Ipv4Addr::new(10, 0, 0, 5), VIP, 40000, 80);
    harness.packet_in("s5", 1, frame);

    let s5 = harness.conn("s5").commands();
    assert_eq!(s5.len(), 2); // ingress rule + packet-out
    assert!(matches!(s5[0], SwitchCommand::InstallRule(_)));
    assert!(matches!(s5[1], SwitchCommand::PacketOut { .. }));
}

/// Packets observed on a switch that never announced a connection are
/// handled without a registered handle: no panic, no delivery.
#[test]
fn unregistered_switch_is_not_fatal() {
    let mut harness = Harness::new(&["s5"]);
    let frame = tcp_frame(mac(7), mac(VIP_MAC_LAST), Ipv4Addr::new(10, 0, 0, 7), VIP, 40000, 80);
    // h7's ingress is s6, which never connected.
    harness.packet_in("s6", 1, frame);
    assert!(harness.conn("s5").is_silent());
}

/// Return traffic from a backend to a known client reinstalls only the
/// un-NAT rule at the backend edge. No hashing involved.
#[test]
fn backend_return_traffic_reinstalls_reverse_rule_only() {
    let mut harness = Harness::all();
    let frame = tcp_frame(
        mac(3),
        mac(5),
        Ipv4Addr::new(10, 0, 0, 3),
        Ipv4Addr::new(10, 0, 0, 5),
        80,
        40000,
    );
    harness.packet_in("s3", 4, frame);

    let s3 = harness.conn("s3").installed_rules();
    assert_eq!(s3.len(), 1);
    assert_eq!(
        s3[0].actions,
        vec![
            Action::SetIpv4Src(VIP),
            Action::SetEthSrc(mac(VIP_MAC_LAST)),
            Action::Output(4),
        ]
    );

    for switch in ["s1", "s2", "s4", "s5", "s6"] {
        assert!(harness.conn(switch).is_silent(), "{switch} should be silent");
    }
}

/// ARP for the VIP under the static policy: the reply claims the configured
/// MAC and leaves through the ingress port.
#[test]
fn arp_request_for_vip_is_answered_out_the_ingress_port() {
    let mut harness = Harness::all();
    harness.packet_in(
        "s5",
        1,
        arp_request(mac(5), Ipv4Addr::new(10, 0, 0, 5), VIP),
    );

    let s5 = harness.conn("s5").commands();
    assert_eq!(s5.len(), 1);
    match &s5[0] {
        SwitchCommand::PacketOut { frame, actions } => {
            assert_eq!(actions, &vec![Action::Output(1)]);
            let parsed = parse_frame(frame).unwrap();
            assert_eq!(parsed.eth_src, mac(VIP_MAC_LAST));
            assert_eq!(parsed.eth_dst, mac(5));
            match parsed.payload {
                FramePayload::Arp(arp) => {
                    assert_eq!(arp.op, 2);
                    assert_eq!(arp.sender_ip, VIP);
                    assert_eq!(arp.sender_mac, mac(VIP_MAC_LAST));
                    assert_eq!(arp.target_ip, Ipv4Addr::new(10, 0, 0, 5));
                }
                other => panic!("expected ARP reply, got {:?}", other),
            }
        }
        other => panic!("expected packet-out, got {:?}", other),
    }
}

/// ARP for some other address is not this responder's concern.
#[test]
fn arp_request_for_other_address_is_ignored() {
    let mut harness = Harness::all();
    harness.packet_in(
        "s5",
        1,
        arp_request(mac(5), Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 1)),
    );
    assert!(harness.conn("s5").is_silent());
}

/// Under learn-first, the first requester's MAC becomes the binding and a
/// later requester cannot move it.
#[test]
fn learn_first_binding_is_first_writer_wins() {
    let mut config = demo_config();
    config.virtual_service.mac = None;
    config.virtual_service.ownership = None; // no MAC, so learn-first
    let mut engine = FlowDecisionEngine::new(&config);

    let s5 = RecordingConnection::new();
    engine.handle_event(ControlEvent::ConnectionUp {
        switch: SwitchId::from("s5"),
        connection: s5.clone(),
    });

    assert_eq!(engine.bound_vip_mac(), None);

    engine.handle_event(ControlEvent::PacketIn {
        switch: SwitchId::from("s5"),
        in_port: 1,
        frame: arp_request(mac(5), Ipv4Addr::new(10, 0, 0, 5), VIP),
    });
    assert_eq!(engine.bound_vip_mac(), Some(mac(5)));

    engine.handle_event(ControlEvent::PacketIn {
        switch: SwitchId::from("s5"),
        in_port: 2,
        frame: arp_request(mac(6), Ipv4Addr::new(10, 0, 0, 6), VIP),
    });
    assert_eq!(engine.bound_vip_mac(), Some(mac(5)));

    // The second reply still claims the original binding.
    let commands = s5.commands();
    assert_eq!(commands.len(), 2);
    match &commands[1] {
        SwitchCommand::PacketOut { frame, .. } => {
            let parsed = parse_frame(frame).unwrap();
            assert_eq!(parsed.eth_src, mac(5));
            assert_eq!(parsed.eth_dst, mac(6));
        }
        other => panic!("expected packet-out, got {:?}", other),
    }
}

/// Garbage bytes cannot crash the dispatcher.
#[test]
fn malformed_frames_are_ignored_with_a_warning() {
    let mut harness = Harness::all();
    harness.packet_in("s5", 1, vec![0xde, 0xad, 0xbe]);
    harness.packet_in("s5", 1, Vec::new());
    for switch in ["s1", "s2", "s3", "s4", "s5", "s6"] {
        assert!(harness.conn(switch).is_silent());
    }
}

/// NAT round trip: the forward rewrite at the backend edge followed by the
/// reverse rewrite restores the addresses the client originally used, so the
/// client only ever observes the virtual address.
#[test]
fn forward_then_reverse_rewrite_restores_original_addresses() {
    let mut harness = Harness::all();
    let frame = tcp_frame(mac(5), mac(VIP_MAC_LAST), Ipv4Addr::new(10, 0, 0, 5), VIP, 40000, 80);
    harness.packet_in("s5", 1, frame);

    let s3 = harness.conn("s3").installed_rules();
    let (reverse, forward) = (&s3[0], &s3[1]);

    // (ip_src, ip_dst, eth_src, eth_dst) as seen on the wire.
    fn apply(
        actions: &[Action],
        mut p: (Ipv4Addr, Ipv4Addr, MacAddr, MacAddr),
    ) -> (Ipv4Addr, Ipv4Addr, MacAddr, MacAddr) {
        for action in actions {
            match action {
                Action::SetIpv4Src(ip) => p.0 = *ip,
                Action::SetIpv4Dst(ip) => p.1 = *ip,
                Action::SetEthSrc(m) => p.2 = *m,
                Action::SetEthDst(m) => p.3 = *m,
                Action::Output(_) => {}
            }
        }
        p
    }

    let original = (Ipv4Addr::new(10, 0, 0, 5), VIP, mac(5), mac(VIP_MAC_LAST));
    let at_backend = apply(&forward.actions, original);
    assert_eq!(
        at_backend,
        (Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 3), mac(5), mac(3))
    );

    // The backend replies by mirroring what it received.
    let reply = (at_backend.1, at_backend.0, at_backend.3, at_backend.2);
    let at_client = apply(&reverse.actions, reply);
    assert_eq!(at_client, (original.1, original.0, original.3, original.2));
}

/// IPv6 and other ethertypes are a silent no-op.
#[test]
fn non_ip_non_arp_traffic_is_silently_ignored() {
    let mut harness = Harness::all();
    let mut frame = vec![0u8; 64];
    frame[12] = 0x86;
    frame[13] = 0xdd;
    harness.packet_in("s5", 1, frame);
    assert!(harness.conn("s5").is_silent());
}
