//! Datagram transport boundary.
//!
//! The node only needs "give me the next datagram, if any" and "send these
//! bytes". `UdpTransport` implements that over a standard UDP socket; tests
//! plug in their own in-memory transport.

mod udp;

use std::net::{Ipv4Addr, SocketAddrV4};

use thiserror::Error;

pub use udp::UdpTransport;

/// One received datagram and the IPv4 address it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub sender: Ipv4Addr,
}

pub trait Transport {
    /// Next datagram, or `Ok(None)` when nothing is waiting.
    fn receive(&mut self) -> Result<Option<Datagram>, TransportError>;

    /// Fire-and-forget send to `to:port`.
    fn send(&mut self, payload: &[u8], to: Ipv4Addr, port: u16) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn receive(&mut self) -> Result<Option<Datagram>, TransportError> {
        (**self).receive()
    }

    fn send(&mut self, payload: &[u8], to: Ipv4Addr, port: u16) -> Result<(), TransportError> {
        (**self).send(payload, to, port)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddrV4,
        #[source]
        source: std::io::Error,
    },
}
