use super::layout::DMX_MAX_SLOTS;
use crate::protocols::common::optional_nonzero_u8;

/// Channel levels carried by one ArtDmx message.
///
/// `slots[0]` is DMX slot 1. Only the first `slot_count` slots are current;
/// the rest may hold zeros or stale levels from an earlier frame.
///
/// # Examples
/// ```
/// use artnode_core::ChannelFrame;
///
/// let mut frame = ChannelFrame::new(0x12);
/// frame.slot_count = 3;
/// frame.slots[..3].copy_from_slice(&[10, 20, 30]);
/// assert_eq!(frame.levels(), &[10, 20, 30]);
/// assert_eq!(frame.sequence_number(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFrame {
    /// Subnet in the high nibble, universe in the low nibble.
    pub universe: u8,
    /// Sequence byte as received; 0 means the sender does not sequence.
    pub sequence: u8,
    /// Active slots, 0..=512.
    pub slot_count: u16,
    pub slots: [u8; DMX_MAX_SLOTS],
}

impl ChannelFrame {
    pub fn new(universe: u8) -> Self {
        Self {
            universe,
            sequence: 0,
            slot_count: 0,
            slots: [0u8; DMX_MAX_SLOTS],
        }
    }

    /// Current levels, `slots[..slot_count]`.
    pub fn levels(&self) -> &[u8] {
        let count = usize::from(self.slot_count).min(DMX_MAX_SLOTS);
        &self.slots[..count]
    }

    pub fn sequence_number(&self) -> Option<u8> {
        optional_nonzero_u8(self.sequence)
    }

    /// Zero every slot and mark the full universe as current.
    pub fn clear(&mut self) {
        self.slots = [0u8; DMX_MAX_SLOTS];
        self.slot_count = DMX_MAX_SLOTS as u16;
    }
}

impl Default for ChannelFrame {
    fn default() -> Self {
        Self::new(0)
    }
}
