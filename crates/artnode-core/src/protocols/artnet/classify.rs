use std::net::Ipv4Addr;

use tracing::trace;

use super::error::ArtNetError;
use super::layout;
use super::parser::{ArtAddress, ArtDmx, parse_artaddress, parse_artdmx, parse_artpoll, parse_header};

/// What an inbound datagram turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not Art-Net, malformed, too old, or ArtDmx for another universe.
    NotProtocol,
    /// ArtDmx for this node's universe; still subject to the merge lock.
    DataFrame(ArtDmx),
    Poll,
    Address(ArtAddress),
    /// Valid header carrying an opcode this node does not handle.
    Other(u16),
}

/// Classify one received datagram for a node listening on `universe`.
///
/// Never fails: anything invalid or irrelevant is `Outcome::NotProtocol`.
pub fn classify(payload: &[u8], sender: Ipv4Addr, universe: u8) -> Outcome {
    let opcode = match parse_header(payload) {
        Ok(Some(opcode)) => opcode,
        Ok(None) => {
            trace!(%sender, len = payload.len(), "ignoring non Art-Net datagram");
            return Outcome::NotProtocol;
        }
        Err(err) => return dropped(sender, None, &err),
    };

    match opcode {
        layout::ARTDMX_OPCODE => match parse_artdmx(payload, sender) {
            Ok(Some(dmx)) if dmx.frame.universe == universe => Outcome::DataFrame(dmx),
            Ok(Some(dmx)) => {
                trace!(
                    %sender,
                    universe = dmx.frame.universe,
                    expected = universe,
                    "ignoring ArtDmx for another universe"
                );
                Outcome::NotProtocol
            }
            Ok(None) => Outcome::NotProtocol,
            Err(err) => dropped(sender, Some(opcode), &err),
        },
        layout::ARTPOLL_OPCODE => match parse_artpoll(payload) {
            Ok(true) => Outcome::Poll,
            Ok(false) => Outcome::NotProtocol,
            Err(err) => dropped(sender, Some(opcode), &err),
        },
        layout::ARTADDRESS_OPCODE => match parse_artaddress(payload) {
            Ok(Some(address)) => Outcome::Address(address),
            Ok(None) => Outcome::NotProtocol,
            Err(err) => dropped(sender, Some(opcode), &err),
        },
        other => Outcome::Other(other),
    }
}

fn dropped(sender: Ipv4Addr, opcode: Option<u16>, err: &ArtNetError) -> Outcome {
    trace!(%sender, ?opcode, %err, "dropping Art-Net datagram");
    Outcome::NotProtocol
}
