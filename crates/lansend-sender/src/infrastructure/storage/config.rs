//! TOML-based configuration for the sender.
//!
//! Reads `SenderConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\LanSend\config.toml`
//! - Linux:    `~/.config/lansend/config.toml`
//! - macOS:    `~/Library/Application Support/LanSend/config.toml`
//!
//! Every field has a default matching the stock LAN setup, so the tool works
//! with no config file at all.  A file only needs the keys it changes:
//!
//! ```toml
//! [sender]
//! broadcast_timeout_secs = 60
//!
//! [transfer]
//! transfer_port = 50011
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  This allows
//! the tool to work correctly on first run (before a config file exists) and
//! when upgrading from an older config file that is missing newer fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level sender configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SenderConfig {
    #[serde(default)]
    pub sender: GeneralConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// General sender behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// How long to announce and wait for a receiver, in seconds.
    #[serde(default = "default_broadcast_timeout_secs")]
    pub broadcast_timeout_secs: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// UDP announcement settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    /// UDP port receivers listen on for announcements.
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,
    /// Destination address for announcement datagrams.
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: String,
    /// Seconds between announcement datagrams.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound on each sleep slice between connected-signal checks,
    /// in milliseconds.
    #[serde(default = "default_poll_slice_ms")]
    pub poll_slice_ms: u64,
}

/// TCP transfer server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferConfig {
    /// TCP port the transfer server listens on.
    #[serde(default = "default_transfer_port")]
    pub transfer_port: u16,
    /// IP address to bind the listener to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Payload read/write chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Extra seconds past the broadcast timeout during which a late
    /// receiver may still connect.
    #[serde(default = "default_accept_grace_secs")]
    pub accept_grace_secs: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_broadcast_timeout_secs() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_discovery_port() -> u16 {
    50000
}
fn default_broadcast_address() -> String {
    "255.255.255.255".to_string()
}
fn default_interval_secs() -> u64 {
    2
}
fn default_poll_slice_ms() -> u64 {
    250
}
fn default_transfer_port() -> u16 {
    50001
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_chunk_size() -> usize {
    4096
}
fn default_accept_grace_secs() -> u64 {
    5
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            sender: GeneralConfig::default(),
            discovery: DiscoveryConfig::default(),
            transfer: TransferConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            broadcast_timeout_secs: default_broadcast_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            discovery_port: default_discovery_port(),
            broadcast_address: default_broadcast_address(),
            interval_secs: default_interval_secs(),
            poll_slice_ms: default_poll_slice_ms(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            transfer_port: default_transfer_port(),
            bind_address: default_bind_address(),
            chunk_size: default_chunk_size(),
            accept_grace_secs: default_accept_grace_secs(),
        }
    }
}

// ── Duration views ────────────────────────────────────────────────────────────

impl SenderConfig {
    /// Total announcement window.
    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_secs(self.sender.broadcast_timeout_secs)
    }

    /// Pause between announcement datagrams.
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs(self.discovery.interval_secs)
    }

    /// Slice length for signal-responsive sleeping.  Clamped to at least
    /// one millisecond so a zero value cannot busy-spin the loop.
    pub fn poll_slice(&self) -> Duration {
        Duration::from_millis(self.discovery.poll_slice_ms.max(1))
    }

    /// How long the transfer server waits for its single accept: the
    /// broadcast timeout plus the grace margin for late receivers.
    pub fn accept_deadline(&self) -> Duration {
        self.broadcast_timeout() + Duration::from_secs(self.transfer.accept_grace_secs)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `SenderConfig` from `explicit` when given, otherwise from the
/// platform config path.
///
/// A missing file at the platform path is normal and yields the defaults;
/// so does an environment without a resolvable config directory.  A missing
/// file at an *explicitly requested* path is an error, since the user named
/// it on purpose.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors (including "not
/// found" for an explicit path) and [`ConfigError::Parse`] if the TOML is
/// malformed.
pub fn load_config(explicit: Option<&Path>) -> Result<SenderConfig, ConfigError> {
    match explicit {
        Some(path) => read_config_file(path, false),
        None => match config_file_path() {
            Ok(path) => read_config_file(&path, true),
            Err(e) => {
                debug!("no platform config directory ({e}); using defaults");
                Ok(SenderConfig::default())
            }
        },
    }
}

/// Reads and parses one config file.  `missing_ok` selects whether a
/// "not found" error falls back to defaults.
fn read_config_file(path: &Path, missing_ok: bool) -> Result<SenderConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: SenderConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if missing_ok && e.kind() == std::io::ErrorKind::NotFound => {
            Ok(SenderConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves the platform config base directory without the `LanSend`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("LanSend"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("lansend"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/LanSend
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("LanSend")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── SenderConfig defaults ─────────────────────────────────────────────────

    #[test]
    fn test_sender_config_default_has_expected_ports() {
        // Arrange / Act
        let cfg = SenderConfig::default();

        // Assert
        assert_eq!(cfg.discovery.discovery_port, 50000);
        assert_eq!(cfg.transfer.transfer_port, 50001);
    }

    #[test]
    fn test_sender_config_default_timing_values() {
        let cfg = SenderConfig::default();
        assert_eq!(cfg.sender.broadcast_timeout_secs, 300);
        assert_eq!(cfg.discovery.interval_secs, 2);
        assert_eq!(cfg.discovery.poll_slice_ms, 250);
        assert_eq!(cfg.transfer.accept_grace_secs, 5);
    }

    #[test]
    fn test_sender_config_default_transfer_values() {
        let cfg = SenderConfig::default();
        assert_eq!(cfg.transfer.bind_address, "0.0.0.0");
        assert_eq!(cfg.transfer.chunk_size, 4096);
        assert_eq!(cfg.discovery.broadcast_address, "255.255.255.255");
    }

    #[test]
    fn test_general_config_default_log_level_is_info() {
        let cfg = GeneralConfig::default();
        assert_eq!(cfg.log_level, "info");
    }

    // ── Duration views ────────────────────────────────────────────────────────

    #[test]
    fn test_accept_deadline_is_timeout_plus_grace() {
        // Arrange
        let mut cfg = SenderConfig::default();
        cfg.sender.broadcast_timeout_secs = 30;
        cfg.transfer.accept_grace_secs = 7;

        // Act / Assert
        assert_eq!(cfg.accept_deadline(), Duration::from_secs(37));
    }

    #[test]
    fn test_poll_slice_clamps_zero_to_one_millisecond() {
        let mut cfg = SenderConfig::default();
        cfg.discovery.poll_slice_ms = 0;
        assert_eq!(cfg.poll_slice(), Duration::from_millis(1));
    }

    // ── TOML round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_sender_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = SenderConfig::default();
        cfg.transfer.transfer_port = 9000;
        cfg.sender.broadcast_timeout_secs = 45;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: SenderConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        // Arrange: sections themselves default, so nothing is required
        let cfg: SenderConfig = toml::from_str("").expect("deserialize empty");

        // Assert
        assert_eq!(cfg, SenderConfig::default());
    }

    #[test]
    fn test_deserialize_partial_transfer_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[transfer]
transfer_port = 9999
"#;

        // Act
        let cfg: SenderConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.transfer.transfer_port, 9999);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.transfer.chunk_size, 4096);
        assert_eq!(cfg.discovery.discovery_port, 50000);
    }

    // ── load_config paths ─────────────────────────────────────────────────────

    #[test]
    fn test_read_config_file_loads_explicit_file() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[sender]\nbroadcast_timeout_secs = 12\n\n[discovery]\ninterval_secs = 1\n",
        )
        .unwrap();

        // Act
        let cfg = load_config(Some(&path)).expect("load");

        // Assert
        assert_eq!(cfg.sender.broadcast_timeout_secs, 12);
        assert_eq!(cfg.discovery.interval_secs, 1);
        assert_eq!(cfg.transfer.transfer_port, 50001);
    }

    #[test]
    fn test_load_config_errors_on_missing_explicit_file() {
        // Arrange
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        // Act
        let result = load_config(Some(&path));

        // Assert – an explicitly named file must exist
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_read_config_file_defaults_when_implicit_file_absent() {
        // Arrange
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        // Act
        let cfg = read_config_file(&path, true).expect("defaults");

        // Assert
        assert_eq!(cfg, SenderConfig::default());
    }

    #[test]
    fn test_load_config_reports_malformed_toml() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_config(Some(&path));

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    // ── config_dir path formation ─────────────────────────────────────────────

    #[test]
    fn test_platform_config_dir_uses_the_lansend_directory() {
        // A stripped container may lack the base env var; when resolution
        // fails there is nothing to assert.
        let Some(dir) = platform_config_dir() else {
            return;
        };

        // The base comes from the environment, the last component is ours.
        let last = dir.file_name().and_then(|n| n.to_str());
        if cfg!(target_os = "linux") {
            assert_eq!(last, Some("lansend"), "got {dir:?}");
        } else {
            assert_eq!(last, Some("LanSend"), "got {dir:?}");
        }
    }

    #[test]
    fn test_config_file_path_ends_with_the_lansend_config_file() {
        // NoPlatformConfigDir in a stripped CI env is acceptable.
        let Ok(path) = config_file_path() else {
            return;
        };

        let tail = if cfg!(target_os = "linux") {
            Path::new("lansend").join("config.toml")
        } else {
            Path::new("LanSend").join("config.toml")
        };
        assert!(
            path.ends_with(&tail),
            "config file must live in the app directory, got {path:?}"
        );
    }
}
