//! Session-aware entry points into the Art-Net codec.

use std::net::Ipv4Addr;

use crate::protocols::artnet::{self, DmxPacket, Outcome, PollReply};
use crate::session::Session;

/// Classify a datagram from `sender` against the session's universe.
pub fn classify(payload: &[u8], sender: Ipv4Addr, session: &Session) -> Outcome {
    artnet::classify(payload, sender, session.universe())
}

/// Encode the session's current levels as an ArtDmx datagram.
///
/// Consumes one outbound sequence number. The datagram is exactly
/// `18 + slot_count` bytes long.
pub fn build_data_frame(session: &mut Session) -> Vec<u8> {
    let sequence = session.next_sequence();
    DmxPacket {
        sequence,
        universe: session.universe(),
        levels: session.frame().levels(),
    }
    .encode()
}

/// Encode an ArtPollReply and pick where it goes.
///
/// The reply goes to the configured broadcast address when there is one,
/// otherwise straight back to `reply_target`.
pub fn build_discovery_reply(session: &Session, reply_target: Ipv4Addr) -> (Vec<u8>, Ipv4Addr) {
    let payload = PollReply {
        address: session.local_address(),
        short_name: session.short_name(),
        long_name: session.long_name(),
        universe: session.universe(),
    }
    .encode();
    let destination = session.broadcast_address().unwrap_or(reply_target);
    (payload, destination)
}
