use std::net::Ipv4Addr;

use super::layout;
use super::writer::ArtNetWriter;

/// Outbound ArtDmx message.
#[derive(Debug, Clone, Copy)]
pub struct DmxPacket<'a> {
    pub sequence: u8,
    pub universe: u8,
    /// At most 512 levels; extra levels are not sent.
    pub levels: &'a [u8],
}

impl DmxPacket<'_> {
    /// Encode to exactly `18 + levels.len()` bytes.
    pub fn encode(&self) -> Vec<u8> {
        let levels = &self.levels[..self.levels.len().min(layout::DMX_MAX_SLOTS)];
        let mut writer = ArtNetWriter::with_header(
            layout::DMX_DATA_OFFSET + levels.len(),
            layout::ARTDMX_OPCODE,
        );
        writer.write_u16_be(layout::PROTOCOL_VERSION_RANGE, layout::PROTOCOL_VERSION);
        writer.write_u8(layout::SEQUENCE_OFFSET, self.sequence);
        writer.write_u8(layout::PHYSICAL_OFFSET, 0);
        writer.write_u8(layout::UNIVERSE_OFFSET, self.universe);
        writer.write_u8(layout::UNIVERSE_HI_OFFSET, 0);
        writer.write_u16_be(layout::LENGTH_RANGE, levels.len() as u16);
        writer.write_slice(layout::DMX_DATA_OFFSET, levels);
        writer.finish()
    }
}

/// Outbound ArtPollReply describing a single output port.
#[derive(Debug, Clone, Copy)]
pub struct PollReply<'a> {
    pub address: Ipv4Addr,
    pub short_name: &'a str,
    pub long_name: &'a str,
    pub universe: u8,
}

impl PollReply<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut writer =
            ArtNetWriter::with_header(layout::REPLY_LEN, layout::ARTPOLL_REPLY_OPCODE);
        writer.write_slice(layout::REPLY_ADDRESS_RANGE.start, &self.address.octets());
        writer.write_u16_le(layout::REPLY_PORT_RANGE, layout::ARTNET_PORT);
        writer.write_slice(layout::REPLY_ESTA_RANGE.start, &layout::REPLY_ESTA_CODE);
        writer.write_ascii_field(layout::REPLY_SHORT_NAME_RANGE, self.short_name);
        writer.write_ascii_field(layout::REPLY_LONG_NAME_RANGE, self.long_name);
        writer.write_u16_be(layout::REPLY_NUM_PORTS_RANGE, layout::REPLY_NUM_PORTS);
        writer.write_u8(layout::REPLY_PORT_TYPE_OFFSET, layout::PORT_TYPE_OUTPUT);
        writer.write_u8(layout::REPLY_GOOD_OUTPUT_OFFSET, layout::GOOD_OUTPUT_TRANSMITTING);
        writer.write_u8(layout::REPLY_SW_OUT_OFFSET, self.universe);
        writer.finish()
    }
}
