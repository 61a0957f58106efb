//! Protocol decoding and encoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader` / `writer`: safe byte access and protocol conventions
//! - `parser` / `builder`: typed messages (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Codecs are pure and contain no I/O; the node and transport layers handle
//! sockets and state.

pub mod artnet;
pub(crate) mod common;
