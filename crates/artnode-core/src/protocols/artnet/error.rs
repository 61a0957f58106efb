use thiserror::Error;

/// Structural failures while decoding an Art-Net datagram.
///
/// `classify` folds every variant into `Outcome::NotProtocol` and traces the
/// reason.
///
/// # Examples
/// ```
/// use artnode_core::protocols::artnet::ArtNetError;
///
/// let err = ArtNetError::UnsupportedVersion { version: 13 };
/// assert!(err.to_string().contains("protocol version 13"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtNetError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("unsupported protocol version {version} (need at least 14)")]
    UnsupportedVersion { version: u16 },
    #[error("invalid ArtDMX length: {length}")]
    InvalidLength { length: u16 },
    #[error("truncated ArtDMX data: declared {declared} slots, {available} available")]
    Truncated { declared: u16, available: usize },
}
