//! Per-universe node state and the merge-lock acceptance policy.
//!
//! A session locks onto the first sender whose ArtDmx it accepts. Until the
//! lock is released by an ArtAddress cancel-merge or clear-buffer command,
//! frames from every other sender are ignored. This is lockout, not HTP/LTP
//! merging.

mod error;

use std::net::Ipv4Addr;

use tracing::debug;

pub use error::SessionError;

use crate::protocols::artnet::layout::{
    DMX_MAX_SLOTS, SELECT_NO_CHANGE, SELECT_PROGRAM, SELECT_VALUE_MASK,
};
use crate::protocols::artnet::{AddressCommand, ArtAddress, ChannelFrame};
use crate::protocols::common::{join_universe, split_universe};

pub const DEFAULT_SHORT_NAME: &str = "artnode";
pub const DEFAULT_LONG_NAME: &str = "artnode DMX node";

/// State for one local node bound to one universe.
///
/// # Examples
/// ```
/// use std::net::Ipv4Addr;
///
/// use artnode_core::Session;
///
/// let session = Session::with_subnet_mask(
///     Ipv4Addr::new(192, 168, 1, 40),
///     Ipv4Addr::new(255, 255, 255, 0),
/// );
/// assert_eq!(session.broadcast_address(), Some(Ipv4Addr::new(192, 168, 1, 255)));
/// assert_eq!(session.merge_lock(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    universe: u8,
    local_address: Ipv4Addr,
    broadcast_address: Option<Ipv4Addr>,
    merge_lock: Option<Ipv4Addr>,
    sequence_out: u8,
    frame: ChannelFrame,
    short_name: String,
    long_name: String,
}

impl Session {
    pub fn new(local_address: Ipv4Addr) -> Self {
        Self {
            universe: 0,
            local_address,
            broadcast_address: None,
            merge_lock: None,
            sequence_out: 1,
            frame: ChannelFrame::new(0),
            short_name: DEFAULT_SHORT_NAME.to_string(),
            long_name: DEFAULT_LONG_NAME.to_string(),
        }
    }

    /// Session whose discovery replies go to the directed broadcast address
    /// of `local_address`/`subnet_mask`.
    pub fn with_subnet_mask(local_address: Ipv4Addr, subnet_mask: Ipv4Addr) -> Self {
        let mut session = Self::new(local_address);
        session.broadcast_address = Some(local_address | !subnet_mask);
        session
    }

    pub fn universe(&self) -> u8 {
        self.universe
    }

    pub fn set_universe(&mut self, universe: u8) {
        self.universe = universe;
    }

    /// `(subnet, universe)` nibbles of the universe byte.
    pub fn subnet_universe(&self) -> (u8, u8) {
        split_universe(self.universe)
    }

    /// Set both nibbles; only the low four bits of each are used.
    pub fn set_subnet_universe(&mut self, subnet: u8, universe: u8) {
        self.universe = join_universe(subnet, universe);
    }

    pub fn local_address(&self) -> Ipv4Addr {
        self.local_address
    }

    pub fn broadcast_address(&self) -> Option<Ipv4Addr> {
        self.broadcast_address
    }

    /// `None` makes discovery replies go straight back to the poller.
    pub fn set_broadcast_address(&mut self, address: Option<Ipv4Addr>) {
        self.broadcast_address = address;
    }

    pub fn merge_lock(&self) -> Option<Ipv4Addr> {
        self.merge_lock
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn set_short_name(&mut self, name: impl Into<String>) {
        self.short_name = name.into();
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn set_long_name(&mut self, name: impl Into<String>) {
        self.long_name = name.into();
    }

    pub fn frame(&self) -> &ChannelFrame {
        &self.frame
    }

    /// Full channel buffer, slot 1 at index 0.
    pub fn dmx_data(&self) -> &[u8; DMX_MAX_SLOTS] {
        &self.frame.slots
    }

    pub fn slot_count(&self) -> u16 {
        self.frame.slot_count
    }

    pub fn set_slot_count(&mut self, count: u16) -> Result<(), SessionError> {
        if usize::from(count) > DMX_MAX_SLOTS {
            return Err(SessionError::SlotCountOutOfRange { count });
        }
        self.frame.slot_count = count;
        Ok(())
    }

    /// Level of a 1-based slot.
    pub fn slot(&self, slot: u16) -> Option<u8> {
        let index = slot_index(slot).ok()?;
        Some(self.frame.slots[index])
    }

    pub fn set_slot(&mut self, slot: u16, value: u8) -> Result<(), SessionError> {
        let index = slot_index(slot)?;
        self.frame.slots[index] = value;
        Ok(())
    }

    /// Current outbound sequence number, then advance it (255 wraps to 1).
    pub fn next_sequence(&mut self) -> u8 {
        let sequence = self.sequence_out;
        self.sequence_out = match sequence.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        sequence
    }

    /// Apply the merge lock to a frame from `sender`.
    ///
    /// Returns `true` and replaces the current frame when `sender` holds the
    /// lock or the session is unlocked; otherwise the frame is untouched.
    pub fn accept(&mut self, candidate: &ChannelFrame, sender: Ipv4Addr) -> bool {
        match self.merge_lock {
            None => {
                debug!(%sender, universe = self.universe, "merge lock acquired");
                self.merge_lock = Some(sender);
            }
            Some(locked) if locked == sender => {}
            Some(locked) => {
                debug!(%sender, %locked, "ignoring frame from unlocked sender");
                return false;
            }
        }
        self.frame = candidate.clone();
        true
    }

    /// Apply an ArtAddress message.
    ///
    /// Returns `true` when the channel levels changed (clear buffer), so the
    /// caller can treat it like a freshly received all-zero frame.
    pub fn apply_address_config(&mut self, config: &ArtAddress) -> bool {
        if !config.short_name.is_empty() {
            self.short_name.clone_from(&config.short_name);
        }
        if !config.long_name.is_empty() {
            self.long_name.clone_from(&config.long_name);
        }

        if let Some(value) = select_value(config.universe_select) {
            self.universe = (self.universe & 0xf0) | value;
            debug!(universe = self.universe, "universe programmed");
        }
        if let Some(value) = select_value(config.subnet_select) {
            self.universe = (self.universe & 0x0f) | (value << 4);
            debug!(universe = self.universe, "subnet programmed");
        }

        match config.command {
            AddressCommand::CancelMerge => {
                debug!(released = ?self.merge_lock, "merge lock cancelled");
                self.merge_lock = None;
                false
            }
            AddressCommand::ClearBuffer => {
                debug!(released = ?self.merge_lock, "channel buffer cleared");
                self.merge_lock = None;
                self.frame.clear();
                true
            }
            AddressCommand::Other(_) => false,
        }
    }
}

/// `0x7f` leaves the value alone, and so does any byte without the program
/// bit. Otherwise the low three bits are the new nibble.
fn select_value(select: u8) -> Option<u8> {
    if select == SELECT_NO_CHANGE || select & SELECT_PROGRAM == 0 {
        return None;
    }
    Some(select & SELECT_VALUE_MASK)
}

fn slot_index(slot: u16) -> Result<usize, SessionError> {
    let index = usize::from(slot);
    if index == 0 || index > DMX_MAX_SLOTS {
        return Err(SessionError::SlotOutOfRange { slot });
    }
    Ok(index - 1)
}
