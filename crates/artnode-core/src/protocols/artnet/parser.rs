use std::net::Ipv4Addr;

use super::error::ArtNetError;
use super::frame::ChannelFrame;
use super::layout;
use super::reader::ArtNetReader;

/// A structurally valid ArtDmx message and the peer it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDmx {
    pub sender: Ipv4Addr,
    pub frame: ChannelFrame,
}

/// Command byte of an ArtAddress message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCommand {
    /// Forget the locked sender; the next sender takes the lock.
    CancelMerge,
    /// Forget the locked sender and zero the whole universe.
    ClearBuffer,
    /// Anything this node does not act on.
    Other(u8),
}

impl AddressCommand {
    pub fn code(self) -> u8 {
        match self {
            AddressCommand::CancelMerge => layout::COMMAND_CANCEL_MERGE,
            AddressCommand::ClearBuffer => layout::COMMAND_CLEAR_BUFFER,
            AddressCommand::Other(code) => code,
        }
    }
}

impl From<u8> for AddressCommand {
    fn from(value: u8) -> Self {
        match value {
            layout::COMMAND_CANCEL_MERGE => AddressCommand::CancelMerge,
            layout::COMMAND_CLEAR_BUFFER => AddressCommand::ClearBuffer,
            other => AddressCommand::Other(other),
        }
    }
}

/// Decoded ArtAddress message.
///
/// The select bytes are kept raw; their sentinel convention is applied by the
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtAddress {
    /// Empty when the controller leaves the name unchanged.
    pub short_name: String,
    /// Empty when the controller leaves the name unchanged.
    pub long_name: String,
    pub universe_select: u8,
    pub subnet_select: u8,
    pub command: AddressCommand,
}

/// Validate the Art-Net signature and return the opcode.
///
/// Returns `Ok(None)` when the payload does not start with `Art-Net\0`.
pub fn parse_header(payload: &[u8]) -> Result<Option<u16>, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    reader.require_len(layout::HEADER_LEN)?;

    let signature = reader.read_signature()?;
    if signature != layout::ARTNET_ID {
        return Ok(None);
    }

    reader.read_u16_le(layout::OP_CODE_RANGE).map(Some)
}

/// Decode an ArtDmx message.
///
/// Padding after the declared slots is tolerated; a declared length that runs
/// past the end of the payload is not.
pub fn parse_artdmx(payload: &[u8], sender: Ipv4Addr) -> Result<Option<ArtDmx>, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    reader.require_len(layout::DMX_DATA_OFFSET)?;

    if !has_opcode(&reader, layout::ARTDMX_OPCODE)? {
        return Ok(None);
    }
    reader.read_protocol_version()?;

    let sequence = reader.read_u8(layout::SEQUENCE_OFFSET)?;
    let universe = reader.read_u8(layout::UNIVERSE_OFFSET)?;
    let length = reader.read_u16_be(layout::LENGTH_RANGE)?;
    if length == 0 || usize::from(length) > layout::DMX_MAX_SLOTS {
        return Err(ArtNetError::InvalidLength { length });
    }

    // require_len above guarantees the subtraction cannot underflow.
    let available = reader.len() - layout::DMX_DATA_OFFSET;
    let data_len = usize::from(length);
    if data_len > available {
        return Err(ArtNetError::Truncated {
            declared: length,
            available,
        });
    }

    let data = reader.read_slice(layout::DMX_DATA_OFFSET..layout::DMX_DATA_OFFSET + data_len)?;
    let mut frame = ChannelFrame::new(universe);
    frame.sequence = sequence;
    frame.slot_count = length;
    frame.slots[..data_len].copy_from_slice(data);

    Ok(Some(ArtDmx { sender, frame }))
}

/// Check that the payload is an ArtPoll this node should answer.
pub fn parse_artpoll(payload: &[u8]) -> Result<bool, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    reader.require_len(layout::ARTPOLL_MIN_LEN)?;

    if !has_opcode(&reader, layout::ARTPOLL_OPCODE)? {
        return Ok(false);
    }
    reader.read_protocol_version()?;
    Ok(true)
}

pub fn parse_artaddress(payload: &[u8]) -> Result<Option<ArtAddress>, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    reader.require_len(layout::ARTADDRESS_MIN_LEN)?;

    if !has_opcode(&reader, layout::ARTADDRESS_OPCODE)? {
        return Ok(None);
    }
    reader.read_protocol_version()?;

    Ok(Some(ArtAddress {
        short_name: reader.read_ascii_string(layout::ADDRESS_SHORT_NAME_RANGE)?,
        long_name: reader.read_ascii_string(layout::ADDRESS_LONG_NAME_RANGE)?,
        universe_select: reader.read_u8(layout::ADDRESS_UNIVERSE_OFFSET)?,
        subnet_select: reader.read_u8(layout::ADDRESS_SUBNET_OFFSET)?,
        command: AddressCommand::from(reader.read_u8(layout::ADDRESS_COMMAND_OFFSET)?),
    }))
}

fn has_opcode(reader: &ArtNetReader<'_>, expected: u16) -> Result<bool, ArtNetError> {
    if reader.read_signature()? != layout::ARTNET_ID {
        return Ok(false);
    }
    Ok(reader.read_u16_le(layout::OP_CODE_RANGE)? == expected)
}
