use std::collections::VecDeque;
use std::io;
use std::net::Ipv4Addr;

use artnode_core::protocols::artnet::{DmxPacket, layout};
use artnode_core::{
    ARTNET_PORT, Datagram, Node, NodeEvent, Session, Transport, TransportError,
};

const NODE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const DESK_A: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);
const DESK_B: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 9);

#[derive(Default)]
struct MemoryTransport {
    inbound: VecDeque<Datagram>,
    sent: Vec<(Vec<u8>, Ipv4Addr, u16)>,
}

impl MemoryTransport {
    fn push(&mut self, payload: Vec<u8>, sender: Ipv4Addr) {
        self.inbound.push_back(Datagram { payload, sender });
    }
}

impl Transport for MemoryTransport {
    fn receive(&mut self) -> Result<Option<Datagram>, TransportError> {
        Ok(self.inbound.pop_front())
    }

    fn send(&mut self, payload: &[u8], to: Ipv4Addr, port: u16) -> Result<(), TransportError> {
        self.sent.push((payload.to_vec(), to, port));
        Ok(())
    }
}

fn artdmx(universe: u8, levels: &[u8]) -> Vec<u8> {
    DmxPacket {
        sequence: 1,
        universe,
        levels,
    }
    .encode()
}

fn header(len: usize, opcode: u16) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    payload[..8].copy_from_slice(layout::ARTNET_ID);
    payload[layout::OP_CODE_RANGE].copy_from_slice(&opcode.to_le_bytes());
    if len >= layout::PROTOCOL_VERSION_RANGE.end {
        payload[layout::PROTOCOL_VERSION_RANGE].copy_from_slice(&[0, 14]);
    }
    payload
}

fn artaddress(command: u8) -> Vec<u8> {
    let mut payload = header(layout::ARTADDRESS_MIN_LEN, layout::ARTADDRESS_OPCODE);
    payload[layout::ADDRESS_UNIVERSE_OFFSET] = layout::SELECT_NO_CHANGE;
    payload[layout::ADDRESS_SUBNET_OFFSET] = layout::SELECT_NO_CHANGE;
    payload[layout::ADDRESS_COMMAND_OFFSET] = command;
    payload
}

#[test]
fn first_desk_locks_universe() {
    let mut transport = MemoryTransport::default();
    transport.push(artdmx(0x00, &[10, 20, 30]), DESK_A);
    transport.push(artdmx(0x00, &[1, 2, 3]), DESK_B);
    let mut node = Node::new(Session::new(NODE), transport);

    assert_eq!(node.poll().unwrap(), NodeEvent::Dmx { sender: DESK_A });
    assert_eq!(node.session().merge_lock(), Some(DESK_A));
    assert_eq!(node.session().frame().levels(), &[10, 20, 30]);

    assert_eq!(node.poll().unwrap(), NodeEvent::Rejected { sender: DESK_B });
    assert_eq!(node.session().frame().levels(), &[10, 20, 30]);
    assert_eq!(node.poll().unwrap(), NodeEvent::Idle);
}

#[test]
fn cancel_merge_hands_lock_to_next_desk() {
    let mut transport = MemoryTransport::default();
    transport.push(artdmx(0, &[10]), DESK_A);
    transport.push(artaddress(layout::COMMAND_CANCEL_MERGE), DESK_A);
    transport.push(artdmx(0, &[99]), DESK_B);
    transport.push(artdmx(0, &[11]), DESK_A);
    let mut node = Node::new(Session::new(NODE), transport);

    node.poll().unwrap();
    assert_eq!(
        node.poll().unwrap(),
        NodeEvent::AddressApplied {
            levels_changed: false
        }
    );
    assert_eq!(node.poll().unwrap(), NodeEvent::Dmx { sender: DESK_B });
    assert_eq!(node.poll().unwrap(), NodeEvent::Rejected { sender: DESK_A });
    assert_eq!(node.session().slot(1), Some(99));
}

#[test]
fn clear_buffer_reports_level_change() {
    let mut transport = MemoryTransport::default();
    transport.push(artdmx(0, &[200; 16]), DESK_A);
    transport.push(artaddress(layout::COMMAND_CLEAR_BUFFER), DESK_B);
    let mut node = Node::new(Session::new(NODE), transport);

    node.poll().unwrap();
    let event = node.poll().unwrap();
    assert!(event.levels_changed());
    assert_eq!(node.session().slot_count(), 512);
    assert!(node.session().dmx_data().iter().all(|level| *level == 0));
    assert_eq!(node.session().merge_lock(), None);

    // The address command is answered like a poll.
    let (_, mut transport) = node.into_parts();
    let (reply, to, port) = transport.sent.pop().unwrap();
    assert_eq!(reply.len(), layout::REPLY_LEN);
    assert_eq!(to, DESK_B);
    assert_eq!(port, ARTNET_PORT);
}

/// Delivers queued datagrams but cannot send anything.
#[derive(Default)]
struct Unreachable {
    inbound: VecDeque<Datagram>,
    attempts: usize,
}

impl Transport for Unreachable {
    fn receive(&mut self) -> Result<Option<Datagram>, TransportError> {
        Ok(self.inbound.pop_front())
    }

    fn send(&mut self, _: &[u8], _: Ipv4Addr, _: u16) -> Result<(), TransportError> {
        self.attempts += 1;
        Err(io::Error::new(io::ErrorKind::NetworkUnreachable, "network unreachable").into())
    }
}

#[test]
fn failed_reply_still_reports_the_event() {
    let mut transport = Unreachable::default();
    for (payload, sender) in [
        (artdmx(0, &[200; 4]), DESK_A),
        (artaddress(layout::COMMAND_CLEAR_BUFFER), DESK_B),
        (header(layout::ARTPOLL_MIN_LEN, layout::ARTPOLL_OPCODE), DESK_B),
    ] {
        transport.inbound.push_back(Datagram { payload, sender });
    }

    // The node borrows the transport so the attempts can be checked after.
    let mut node = Node::new(Session::new(NODE), &mut transport);
    assert_eq!(node.poll().unwrap(), NodeEvent::Dmx { sender: DESK_A });
    assert_eq!(
        node.poll().unwrap(),
        NodeEvent::AddressApplied {
            levels_changed: true
        }
    );
    assert_eq!(node.session().slot_count(), 512);
    assert_eq!(node.session().slot(1), Some(0));
    assert_eq!(node.session().merge_lock(), None);
    assert_eq!(
        node.poll().unwrap(),
        NodeEvent::PollReplied {
            destination: DESK_B
        }
    );
    assert_eq!(node.poll().unwrap(), NodeEvent::Idle);
    drop(node);

    assert_eq!(transport.attempts, 2);
}

#[test]
fn poll_is_answered_to_poller_or_broadcast() {
    let mut transport = MemoryTransport::default();
    transport.push(header(layout::ARTPOLL_MIN_LEN, layout::ARTPOLL_OPCODE), DESK_A);
    let mut node = Node::new(Session::new(NODE), transport);
    assert_eq!(
        node.poll().unwrap(),
        NodeEvent::PollReplied {
            destination: DESK_A
        }
    );

    let broadcast = Ipv4Addr::new(10, 255, 255, 255);
    node.session_mut().set_broadcast_address(Some(broadcast));
    node.transport_mut()
        .push(header(layout::ARTPOLL_MIN_LEN, layout::ARTPOLL_OPCODE), DESK_B);
    assert_eq!(
        node.poll().unwrap(),
        NodeEvent::PollReplied {
            destination: broadcast
        }
    );

    let (_, transport) = node.into_parts();
    let destinations: Vec<Ipv4Addr> = transport.sent.iter().map(|(_, to, _)| *to).collect();
    assert_eq!(destinations, vec![DESK_A, broadcast]);
    assert_eq!(&transport.sent[0].0[10..14], &NODE.octets());
}

#[test]
fn address_reprograms_universe() {
    let mut payload = artaddress(0);
    payload[layout::ADDRESS_UNIVERSE_OFFSET] = 0x82;
    payload[layout::ADDRESS_SUBNET_OFFSET] = 0x81;
    let mut transport = MemoryTransport::default();
    transport.push(payload, DESK_A);
    transport.push(artdmx(0x00, &[5]), DESK_A);
    transport.push(artdmx(0x12, &[6]), DESK_A);
    let mut node = Node::new(Session::new(NODE), transport);

    node.poll().unwrap();
    assert_eq!(node.session().universe(), 0x12);
    assert_eq!(node.poll().unwrap(), NodeEvent::Ignored);
    assert_eq!(node.poll().unwrap(), NodeEvent::Dmx { sender: DESK_A });
    assert_eq!(node.session().slot(1), Some(6));
}

#[test]
fn junk_and_other_opcodes_leave_state_alone() {
    let mut transport = MemoryTransport::default();
    transport.push(artdmx(0, &[42]), DESK_A);
    transport.push(b"hello world".to_vec(), DESK_A);
    transport.push(header(layout::HEADER_LEN, 0x9700), DESK_A);
    let mut truncated = artdmx(0, &[1, 2, 3]);
    truncated.truncate(19);
    transport.push(truncated, DESK_A);
    let mut node = Node::new(Session::new(NODE), transport);

    node.poll().unwrap();
    assert_eq!(node.poll().unwrap(), NodeEvent::Ignored);
    assert_eq!(node.poll().unwrap(), NodeEvent::Other(0x9700));
    assert_eq!(node.poll().unwrap(), NodeEvent::Ignored);
    assert_eq!(node.session().frame().levels(), &[42]);
}

#[test]
fn send_dmx_uses_configured_port() {
    let mut session = Session::new(NODE);
    session.set_slot_count(2).unwrap();
    session.set_slot(2, 77).unwrap();
    let mut node = Node::new(session, MemoryTransport::default()).with_port(6455);

    node.send_dmx(DESK_A).unwrap();
    node.send_dmx(DESK_A).unwrap();

    let (_, transport) = node.into_parts();
    let (first, to, port) = &transport.sent[0];
    assert_eq!((*to, *port), (DESK_A, 6455));
    assert_eq!(first.len(), 20);
    assert_eq!(&first[18..], &[0, 77]);
    assert_eq!(first[layout::SEQUENCE_OFFSET], 1);
    assert_eq!(transport.sent[1].0[layout::SEQUENCE_OFFSET], 2);
}
