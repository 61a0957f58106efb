//! Receive/reply driver tying transport, codec and session together.

use std::net::Ipv4Addr;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::codec::{build_data_frame, build_discovery_reply, classify};
use crate::protocols::artnet::Outcome;
use crate::protocols::artnet::layout::ARTNET_PORT;
use crate::session::Session;
use crate::transport::{Datagram, Transport, TransportError};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result of one `Node::poll` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// No datagram was waiting.
    Idle,
    /// Not Art-Net, malformed, or ArtDmx for another universe.
    Ignored,
    /// ArtDmx accepted; the session holds new levels.
    Dmx { sender: Ipv4Addr },
    /// ArtDmx dropped because another sender holds the merge lock.
    Rejected { sender: Ipv4Addr },
    /// ArtPoll answered with an ArtPollReply. A failed reply send is logged,
    /// not returned.
    PollReplied { destination: Ipv4Addr },
    /// ArtAddress applied and answered. `levels_changed` is set for a
    /// clear-buffer command.
    AddressApplied { levels_changed: bool },
    /// Art-Net opcode this node does not handle.
    Other(u16),
}

impl NodeEvent {
    /// True when the session's channel levels changed during this step.
    pub fn levels_changed(&self) -> bool {
        matches!(
            self,
            NodeEvent::Dmx { .. }
                | NodeEvent::AddressApplied {
                    levels_changed: true
                }
        )
    }
}

/// An Art-Net node: one session behind one transport.
///
/// Each `poll` handles at most one datagram to completion before returning.
#[derive(Debug)]
pub struct Node<T> {
    session: Session,
    transport: T,
    port: u16,
}

impl<T: Transport> Node<T> {
    pub fn new(session: Session, transport: T) -> Self {
        Self {
            session,
            transport,
            port: ARTNET_PORT,
        }
    }

    /// Destination port for replies and outbound frames (default 6454).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_parts(self) -> (Session, T) {
        (self.session, self.transport)
    }

    /// Read and handle at most one datagram.
    pub fn poll(&mut self) -> Result<NodeEvent, NodeError> {
        match self.transport.receive()? {
            Some(datagram) => self.handle(&datagram),
            None => Ok(NodeEvent::Idle),
        }
    }

    /// Handle a datagram obtained outside `poll`.
    pub fn handle(&mut self, datagram: &Datagram) -> Result<NodeEvent, NodeError> {
        let sender = datagram.sender;
        match classify(&datagram.payload, sender, &self.session) {
            Outcome::NotProtocol => Ok(NodeEvent::Ignored),
            Outcome::DataFrame(dmx) => {
                if self.session.accept(&dmx.frame, dmx.sender) {
                    trace!(%sender, slots = dmx.frame.slot_count, "ArtDmx accepted");
                    Ok(NodeEvent::Dmx { sender })
                } else {
                    Ok(NodeEvent::Rejected { sender })
                }
            }
            Outcome::Poll => {
                let destination = self.reply(sender);
                Ok(NodeEvent::PollReplied { destination })
            }
            Outcome::Address(config) => {
                let levels_changed = self.session.apply_address_config(&config);
                self.reply(sender);
                Ok(NodeEvent::AddressApplied { levels_changed })
            }
            Outcome::Other(opcode) => {
                trace!(%sender, opcode, "unhandled opcode");
                Ok(NodeEvent::Other(opcode))
            }
        }
    }

    /// Send the session's current levels as one ArtDmx datagram.
    pub fn send_dmx(&mut self, to: Ipv4Addr) -> Result<(), NodeError> {
        let payload = build_data_frame(&mut self.session);
        self.transport.send(&payload, to, self.port)?;
        Ok(())
    }

    // Send failures are logged only; the session has already changed.
    fn reply(&mut self, poller: Ipv4Addr) -> Ipv4Addr {
        let (payload, destination) = build_discovery_reply(&self.session, poller);
        match self.transport.send(&payload, destination, self.port) {
            Ok(()) => debug!(%poller, %destination, "ArtPollReply sent"),
            Err(err) => warn!(%poller, %destination, %err, "failed to send ArtPollReply"),
        }
        destination
    }
}
