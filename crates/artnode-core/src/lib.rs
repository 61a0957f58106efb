//! Art-Net node core: packet codec, merge-lock session and receive driver.
//!
//! Datagrams flow transport -> codec (`classify`) -> session (`accept` /
//! `apply_address_config`). The codec is byte-oriented and side-effect free;
//! all socket I/O sits behind the `Transport` trait. Outbound ArtDmx and
//! ArtPollReply datagrams are built from session state.
//!
//! Invariants:
//! - Nothing received from the network can make the core fail or panic;
//!   invalid or irrelevant datagrams are ignored and state is preserved.
//! - Channel levels change only on an accepted ArtDmx or a clear-buffer
//!   command.
//! - Once a session is locked to a sender, no other sender changes its levels
//!   until the lock is cancelled.
//! - Outbound sequence numbers run 1..=255 and never emit 0.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur d'un nœud Art-Net : transport -> codec
//! (`classify`) -> session (verrou de fusion, configuration ArtAddress).
//! Aucune donnée reçue ne peut faire échouer le nœud ; les niveaux DMX ne
//! changent que sur un ArtDmx accepté ou une commande d'effacement.
//!
//! # Examples
//! ```
//! use std::net::Ipv4Addr;
//!
//! use artnode_core::{Outcome, Session, build_data_frame, classify};
//!
//! let mut controller = Session::new(Ipv4Addr::new(10, 0, 0, 5));
//! controller.set_slot_count(3)?;
//! controller.set_slot(1, 255)?;
//! let datagram = build_data_frame(&mut controller);
//!
//! let mut node = Session::new(Ipv4Addr::new(10, 0, 0, 20));
//! if let Outcome::DataFrame(dmx) = classify(&datagram, Ipv4Addr::new(10, 0, 0, 5), &node) {
//!     assert!(node.accept(&dmx.frame, dmx.sender));
//! }
//! assert_eq!(node.slot(1), Some(255));
//! # Ok::<(), artnode_core::SessionError>(())
//! ```

pub mod codec;
pub mod config;
pub mod node;
pub mod protocols;
pub mod session;
pub mod transport;

pub use codec::{build_data_frame, build_discovery_reply, classify};
pub use config::{ConfigError, NodeConfig};
pub use node::{Node, NodeError, NodeEvent};
pub use protocols::artnet::layout::{ARTNET_PORT, DMX_MAX_SLOTS};
pub use protocols::artnet::{AddressCommand, ArtAddress, ArtDmx, ChannelFrame, Outcome};
pub use session::{Session, SessionError};
pub use transport::{Datagram, Transport, TransportError, UdpTransport};
