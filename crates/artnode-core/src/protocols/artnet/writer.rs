use std::ops::Range;

use super::layout;

/// Fixed-layout staging buffer for outbound Art-Net datagrams.
///
/// All offsets come from `layout`; the buffer is sized up front so every
/// write lands inside it.
pub struct ArtNetWriter {
    buf: Vec<u8>,
}

impl ArtNetWriter {
    /// Zeroed buffer of `len` bytes with the signature and opcode in place.
    pub fn with_header(len: usize, opcode: u16) -> Self {
        let mut writer = Self {
            buf: vec![0u8; len.max(layout::HEADER_LEN)],
        };
        writer.write_slice(0, layout::ARTNET_ID);
        writer.write_u16_le(layout::OP_CODE_RANGE, opcode);
        writer
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) {
        self.buf[offset] = value;
    }

    pub fn write_u16_le(&mut self, range: Range<usize>, value: u16) {
        self.buf[range].copy_from_slice(&value.to_le_bytes());
    }

    pub fn write_u16_be(&mut self, range: Range<usize>, value: u16) {
        self.buf[range].copy_from_slice(&value.to_be_bytes());
    }

    pub fn write_slice(&mut self, offset: usize, bytes: &[u8]) {
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Zero-padded ASCII field; always keeps a trailing NUL.
    pub fn write_ascii_field(&mut self, range: Range<usize>, text: &str) {
        let width = range.len().saturating_sub(1);
        let bytes = text.as_bytes();
        let len = bytes.len().min(width);
        let field = &mut self.buf[range];
        field.fill(0);
        field[..len].copy_from_slice(&bytes[..len]);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
