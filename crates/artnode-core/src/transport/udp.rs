use std::io::{self, ErrorKind};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use tracing::{debug, trace};

use super::{Datagram, Transport, TransportError};
use crate::protocols::artnet::layout::DATAGRAM_MAX;

/// `Transport` over a broadcast-enabled IPv4 UDP socket.
///
/// In blocking mode `receive` waits for the next datagram (or the read
/// timeout); in non-blocking mode it returns `Ok(None)` immediately when the
/// socket is empty. Datagrams longer than one full ArtDmx are truncated.
///
/// # Examples
/// ```no_run
/// use std::net::{Ipv4Addr, SocketAddrV4};
///
/// use artnode_core::{ARTNET_PORT, UdpTransport};
///
/// let transport = UdpTransport::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, ARTNET_PORT))?;
/// transport.set_nonblocking(true)?;
/// # Ok::<(), artnode_core::TransportError>(())
/// ```
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpTransport {
    pub fn bind(addr: SocketAddrV4) -> Result<Self, TransportError> {
        let socket =
            UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket.set_broadcast(true)?;
        debug!(%addr, "udp transport bound");
        Ok(Self {
            socket,
            buf: vec![0u8; DATAGRAM_MAX],
        })
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<(), TransportError> {
        self.socket.set_nonblocking(nonblocking)?;
        Ok(())
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<(), TransportError> {
        self.socket.set_read_timeout(timeout)?;
        Ok(())
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Transport for UdpTransport {
    fn receive(&mut self) -> Result<Option<Datagram>, TransportError> {
        loop {
            match self.socket.recv_from(&mut self.buf) {
                Ok((len, SocketAddr::V4(from))) => {
                    return Ok(Some(Datagram {
                        payload: self.buf[..len].to_vec(),
                        sender: *from.ip(),
                    }));
                }
                Ok((_, SocketAddr::V6(from))) => {
                    trace!(%from, "ignoring IPv6 datagram");
                }
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(None);
                }
                Err(err) if is_oversized(&err) => {
                    trace!(%err, "ignoring oversized datagram");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn send(&mut self, payload: &[u8], to: Ipv4Addr, port: u16) -> Result<(), TransportError> {
        self.socket.send_to(payload, SocketAddrV4::new(to, port))?;
        Ok(())
    }
}

/// Windows fails `recv_from` with WSAEMSGSIZE when a datagram does not fit
/// the buffer; other platforms truncate it.
#[cfg(windows)]
fn is_oversized(err: &io::Error) -> bool {
    const WSAEMSGSIZE: i32 = 10040;
    err.raw_os_error() == Some(WSAEMSGSIZE)
}

#[cfg(not(windows))]
fn is_oversized(_: &io::Error) -> bool {
    false
}
