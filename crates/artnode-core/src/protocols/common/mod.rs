//! Byte conventions shared across Art-Net messages.

/// A zero sequence byte means the sender does not sequence its frames.
pub(crate) fn optional_nonzero_u8(value: u8) -> Option<u8> {
    if value == 0 { None } else { Some(value) }
}

/// Split a universe byte into `(subnet, universe)` nibbles.
pub(crate) fn split_universe(value: u8) -> (u8, u8) {
    (value >> 4, value & 0x0f)
}

/// Pack subnet and universe nibbles; higher bits of either are dropped.
pub(crate) fn join_universe(subnet: u8, universe: u8) -> u8 {
    ((subnet & 0x0f) << 4) | (universe & 0x0f)
}
