//! Art-Net protocol codec.
//!
//! The parser validates the Art-Net signature, opcode and protocol version,
//! then decodes ArtDmx, ArtPoll and ArtAddress payloads into typed messages.
//! Declared ArtDmx lengths must fit inside the received datagram; trailing
//! padding is tolerated. `classify` folds every decoding failure into
//! `Outcome::NotProtocol` so nothing on the wire can fail the node.
//!
//! Outbound messages (`DmxPacket`, `PollReply`) are separate typed values
//! encoded through `ArtNetWriter`. Byte offsets live in `layout`, safe reads
//! in `reader`.
//!
//! Version française (résumé):
//! Le module décode ArtDmx/ArtPoll/ArtAddress (signature, opcode, version
//! >= 14, longueur déclarée contenue dans le datagramme) et encode ArtDmx et
//! ArtPollReply. Les positions sont dans `layout`, les lectures dans `reader`.

pub mod builder;
pub mod classify;
pub mod error;
pub mod frame;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use builder::{DmxPacket, PollReply};
pub use classify::{Outcome, classify};
pub use error::ArtNetError;
pub use frame::ChannelFrame;
pub use parser::{AddressCommand, ArtAddress, ArtDmx, parse_artaddress, parse_artdmx, parse_artpoll};
