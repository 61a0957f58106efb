use thiserror::Error;

/// Out-of-range values passed to the session configuration surface.
///
/// # Examples
/// ```
/// use artnode_core::SessionError;
///
/// let err = SessionError::SlotOutOfRange { slot: 0 };
/// assert!(err.to_string().contains("slot 0"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("slot count {count} exceeds 512")]
    SlotCountOutOfRange { count: u16 },
    #[error("slot {slot} is outside 1..=512")]
    SlotOutOfRange { slot: u16 },
}
