//! Node configuration loaded from JSON.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocols::artnet::layout::{
    ADDRESS_LONG_NAME_RANGE, ADDRESS_SHORT_NAME_RANGE, ARTNET_PORT,
};
use crate::session::{DEFAULT_LONG_NAME, DEFAULT_SHORT_NAME, Session};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`broadcast` and `subnet_mask` cannot both be set")]
    BroadcastConflict,
    #[error("{field} is {len} bytes, at most {max} fit in a reply")]
    NameTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// Settings for one node. Every field has a default, so `{}` is a valid file.
///
/// # Examples
/// ```
/// use std::net::Ipv4Addr;
///
/// use artnode_core::NodeConfig;
///
/// let config = NodeConfig::from_json_str(
///     r#"{ "address": "10.0.0.1", "subnet_mask": "255.0.0.0", "universe": 3 }"#,
/// )?;
/// let session = config.session()?;
/// assert_eq!(session.universe(), 3);
/// assert_eq!(session.broadcast_address(), Some(Ipv4Addr::new(10, 255, 255, 255)));
/// # Ok::<(), artnode_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Address reported in discovery replies.
    pub address: Ipv4Addr,
    /// Derive the reply broadcast address from `address`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_mask: Option<Ipv4Addr>,
    /// Explicit reply broadcast address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<Ipv4Addr>,
    /// Subnet in the high nibble, universe in the low nibble.
    pub universe: u8,
    pub short_name: String,
    pub long_name: String,
    /// UDP port for replies and outbound frames.
    pub port: u16,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::UNSPECIFIED,
            subnet_mask: None,
            broadcast: None,
            universe: 0,
            short_name: DEFAULT_SHORT_NAME.to_string(),
            long_name: DEFAULT_LONG_NAME.to_string(),
            port: ARTNET_PORT,
        }
    }
}

impl NodeConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast.is_some() && self.subnet_mask.is_some() {
            return Err(ConfigError::BroadcastConflict);
        }
        check_name("short_name", &self.short_name, ADDRESS_SHORT_NAME_RANGE.len() - 1)?;
        check_name("long_name", &self.long_name, ADDRESS_LONG_NAME_RANGE.len() - 1)?;
        Ok(())
    }

    /// Validate and build a fresh session.
    pub fn session(&self) -> Result<Session, ConfigError> {
        self.validate()?;
        let mut session = match self.subnet_mask {
            Some(mask) => Session::with_subnet_mask(self.address, mask),
            None => Session::new(self.address),
        };
        if self.broadcast.is_some() {
            session.set_broadcast_address(self.broadcast);
        }
        session.set_universe(self.universe);
        session.set_short_name(self.short_name.clone());
        session.set_long_name(self.long_name.clone());
        Ok(session)
    }
}

fn check_name(field: &'static str, value: &str, max: usize) -> Result<(), ConfigError> {
    if value.len() > max {
        return Err(ConfigError::NameTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{ConfigError, NodeConfig};

    #[test]
    fn empty_object_uses_defaults() {
        let config = NodeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.port, 6454);
    }

    #[test]
    fn explicit_broadcast_is_used() {
        let config = NodeConfig::from_json_str(
            r#"{ "address": "192.168.0.9", "broadcast": "192.168.0.255", "short_name": "rig" }"#,
        )
        .unwrap();
        let session = config.session().unwrap();
        assert_eq!(session.broadcast_address(), Some(Ipv4Addr::new(192, 168, 0, 255)));
        assert_eq!(session.short_name(), "rig");
    }

    #[test]
    fn broadcast_and_mask_conflict() {
        let err = NodeConfig::from_json_str(
            r#"{ "broadcast": "10.255.255.255", "subnet_mask": "255.0.0.0" }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::BroadcastConflict));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = NodeConfig::from_json_str(r#"{ "univers": 1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn long_short_name_is_rejected() {
        let mut config = NodeConfig::default();
        config.short_name = "x".repeat(18);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("short_name is 18 bytes"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        let err = NodeConfig::from_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("node.json"));
    }
}
