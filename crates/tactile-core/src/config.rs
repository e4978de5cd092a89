//! Configuration for the tactile bridge.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $TACTILE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/tactile/config.toml
//!   3. ~/.config/tactile/config.toml

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::packet::Trailing;
use crate::wire::INT_FIELD_LEN;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TactileConfig {
    pub network: NetworkConfig,
    pub codec: CodecConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the bridge receives datagrams on.
    pub bind_addr: SocketAddr,
    /// Where compressed packets go after encoding a SERVER request.
    pub server_addr: SocketAddr,
    /// Where raw samples go after decoding a CLIENT packet.
    pub client_addr: SocketAddr,
    /// Receive and scratch buffer size in bytes. Larger datagrams are cut.
    pub buffer_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Touch points per datagram. Agreed with both peers out of band.
    pub point_count: usize,
    /// Samples per touch point per datagram.
    pub frame_count: usize,
    /// Reject packets with bytes left over after the last point.
    pub strict_trailing: bool,
}

impl CodecConfig {
    pub fn trailing(&self) -> Trailing {
        if self.strict_trailing {
            Trailing::Reject
        } else {
            Trailing::Tolerate
        }
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5300)),
            server_addr: SocketAddr::from(([127, 0, 0, 1], 5301)),
            client_addr: SocketAddr::from(([127, 0, 0, 1], 5302)),
            buffer_size: 8192,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            point_count: 3,
            frame_count: 512,
            strict_trailing: false,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("tactile")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl TactileConfig {
    /// Load config: env vars → file → defaults. The result is validated.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            TactileConfig::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without applying env overrides.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("TACTILE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&TactileConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Reject settings the bridge cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.codec.point_count == 0 {
            return Err(ConfigError::Invalid("codec.point_count must be at least 1"));
        }
        if self.codec.frame_count == 0 {
            return Err(ConfigError::Invalid("codec.frame_count must be at least 1"));
        }
        if self.network.buffer_size < INT_FIELD_LEN {
            return Err(ConfigError::Invalid(
                "network.buffer_size cannot hold a role tag",
            ));
        }
        Ok(())
    }

    /// Apply TACTILE_* overrides. `lookup` is `std::env::var` in production.
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(v: Option<String>) -> Option<T> {
            v.and_then(|s| s.trim().parse().ok())
        }

        if let Some(a) = parsed(lookup("TACTILE_NETWORK__BIND_ADDR")) {
            self.network.bind_addr = a;
        }
        if let Some(a) = parsed(lookup("TACTILE_NETWORK__SERVER_ADDR")) {
            self.network.server_addr = a;
        }
        if let Some(a) = parsed(lookup("TACTILE_NETWORK__CLIENT_ADDR")) {
            self.network.client_addr = a;
        }
        if let Some(n) = parsed(lookup("TACTILE_NETWORK__BUFFER_SIZE")) {
            self.network.buffer_size = n;
        }
        if let Some(n) = parsed(lookup("TACTILE_CODEC__POINT_COUNT")) {
            self.codec.point_count = n;
        }
        if let Some(n) = parsed(lookup("TACTILE_CODEC__FRAME_COUNT")) {
            self.codec.frame_count = n;
        }
        if let Some(v) = lookup("TACTILE_CODEC__STRICT_TRAILING") {
            self.codec.strict_trailing = v == "true" || v == "1";
        }
    }
}
