use std::ops::Range;

use super::error::ArtNetError;
use super::layout;

/// Bounds-checked access to an inbound Art-Net payload.
pub struct ArtNetReader<'a> {
    payload: &'a [u8],
}

impl<'a> ArtNetReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ArtNetError> {
        if self.payload.len() < needed {
            return Err(ArtNetError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ArtNetError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(ArtNetError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_le(&self, range: Range<usize>) -> Result<u16, ArtNetError> {
        let bytes = self.read_pair(range)?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn read_u16_be(&self, range: Range<usize>) -> Result<u16, ArtNetError> {
        let bytes = self.read_pair(range)?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], ArtNetError> {
        self.payload
            .get(range.clone())
            .ok_or(ArtNetError::TooShort {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    pub fn read_signature(&self) -> Result<&'a [u8], ArtNetError> {
        self.read_slice(0..layout::ARTNET_ID.len())
    }

    /// Protocol version, required to be at least 14.
    pub fn read_protocol_version(&self) -> Result<u16, ArtNetError> {
        let version = self.read_u16_be(layout::PROTOCOL_VERSION_RANGE)?;
        if version < layout::PROTOCOL_VERSION {
            return Err(ArtNetError::UnsupportedVersion { version });
        }
        Ok(version)
    }

    /// NUL-terminated ASCII field. Stops at the first NUL; spaces are kept.
    pub fn read_ascii_string(&self, range: Range<usize>) -> Result<String, ArtNetError> {
        let bytes = self.read_slice(range)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    fn read_pair(&self, range: Range<usize>) -> Result<[u8; 2], ArtNetError> {
        let bytes = self.read_slice(range)?;
        match bytes {
            [a, b] => Ok([*a, *b]),
            _ => Err(ArtNetError::TooShort {
                needed: 2,
                actual: bytes.len(),
            }),
        }
    }
}
