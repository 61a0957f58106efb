//! Art-Net byte offsets and protocol constants.
//!
//! Offsets are counted from the start of the UDP payload. Ranges are the
//! source of truth for both the parser and the writer.

use std::ops::Range;

pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";
/// UDP port 6454.
pub const ARTNET_PORT: u16 = 0x1936;

pub const OP_CODE_RANGE: Range<usize> = 8..10;
pub const PROTOCOL_VERSION_RANGE: Range<usize> = 10..12;
pub const HEADER_LEN: usize = 10;
pub const PROTOCOL_VERSION: u16 = 14;

pub const ARTPOLL_OPCODE: u16 = 0x2000;
pub const ARTPOLL_REPLY_OPCODE: u16 = 0x2100;
pub const ARTDMX_OPCODE: u16 = 0x5000;
pub const ARTADDRESS_OPCODE: u16 = 0x6000;

// ArtDmx
pub const SEQUENCE_OFFSET: usize = 12;
pub const PHYSICAL_OFFSET: usize = 13;
pub const UNIVERSE_OFFSET: usize = 14;
pub const UNIVERSE_HI_OFFSET: usize = 15;
pub const LENGTH_RANGE: Range<usize> = 16..18;
pub const DMX_DATA_OFFSET: usize = 18;
pub const DMX_MAX_SLOTS: usize = 512;
/// Largest datagram the node ever needs to read.
pub const DATAGRAM_MAX: usize = DMX_DATA_OFFSET + DMX_MAX_SLOTS;

// ArtPoll
pub const ARTPOLL_MIN_LEN: usize = 14;

// ArtAddress
pub const ADDRESS_SHORT_NAME_RANGE: Range<usize> = 12..30;
pub const ADDRESS_LONG_NAME_RANGE: Range<usize> = 30..94;
/// First output universe switch (SwOut[0]).
pub const ADDRESS_UNIVERSE_OFFSET: usize = 98;
/// Subnet switch.
pub const ADDRESS_SUBNET_OFFSET: usize = 102;
pub const ADDRESS_COMMAND_OFFSET: usize = 107;
pub const ARTADDRESS_MIN_LEN: usize = 108;

pub const SELECT_NO_CHANGE: u8 = 0x7f;
pub const SELECT_PROGRAM: u8 = 0x80;
pub const SELECT_VALUE_MASK: u8 = 0x07;

pub const COMMAND_CANCEL_MERGE: u8 = 0x01;
pub const COMMAND_CLEAR_BUFFER: u8 = 0x90;

// ArtPollReply
pub const REPLY_LEN: usize = 239;
pub const REPLY_ADDRESS_RANGE: Range<usize> = 10..14;
pub const REPLY_PORT_RANGE: Range<usize> = 14..16;
pub const REPLY_ESTA_RANGE: Range<usize> = 24..26;
pub const REPLY_SHORT_NAME_RANGE: Range<usize> = 26..44;
pub const REPLY_LONG_NAME_RANGE: Range<usize> = 44..108;
pub const REPLY_NUM_PORTS_RANGE: Range<usize> = 172..174;
pub const REPLY_PORT_TYPE_OFFSET: usize = 174;
pub const REPLY_GOOD_OUTPUT_OFFSET: usize = 182;
pub const REPLY_SW_OUT_OFFSET: usize = 190;

pub const REPLY_ESTA_CODE: [u8; 2] = [0x50, 0x12];
pub const REPLY_NUM_PORTS: u16 = 1;
/// Port can output DMX from the network.
pub const PORT_TYPE_OUTPUT: u8 = 0x80;
/// Output port is transmitting data.
pub const GOOD_OUTPUT_TRANSMITTING: u8 = 0x80;
