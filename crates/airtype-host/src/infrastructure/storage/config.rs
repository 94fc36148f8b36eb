//! TOML-based configuration persistence for the host application.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\AirType\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/airtype/config.toml` (or `~/.config/airtype`)
//! - macOS:    `~/Library/Application Support/AirType/config.toml`
//!
//! Example file:
//!
//! ```toml
//! [general]
//! mode = "relay"
//! log_level = "info"
//!
//! [lan]
//! bind_address = "0.0.0.0"
//! port = 5000
//! mute_idle_timeout_secs = 120
//!
//! [paste]
//! use_secondary_combo = true
//! preserve_clipboard = false
//!
//! [relay]
//! url = "https://relay.example.com"
//! password = ""
//! ```
//!
//! # Serde default values
//!
//! Every field carries a `#[serde(default ...)]` so a partial file, or one
//! written by an older version, still loads.  A missing section reads as
//! that section's defaults.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use airtype_core::PasteConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

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

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// How the phone reaches this host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Phone posts to the built-in HTTP server on the local network.
    #[default]
    Lan,
    /// Host holds an outbound WebSocket to the hosted relay.
    Relay,
}

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub lan: LanConfig,
    #[serde(default)]
    pub paste: PasteConfig,
    #[serde(default)]
    pub relay: RelaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    #[serde(default)]
    pub mode: Mode,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// LAN HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanConfig {
    /// IP address to bind to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Release an app-owned mute after this many seconds without a request
    /// from the phone.  `0` disables the release.
    #[serde(default = "default_mute_idle_timeout_secs")]
    pub mute_idle_timeout_secs: u64,
}

/// Relay connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelaySettings {
    #[serde(default)]
    pub url: String,
    /// Shared with the phone.  Empty selects the default room.
    #[serde(default)]
    pub password: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_mute_idle_timeout_secs() -> u64 {
    120
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LanConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            mute_idle_timeout_secs: default_mute_idle_timeout_secs(),
        }
    }
}

impl LanConfig {
    /// Bind address and port as a socket address.
    ///
    /// IPv6 addresses may be written bare (`::`) or bracketed (`[::1]`).
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let host = self.bind_address.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip: IpAddr = host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// `None` when idle release is disabled.
    pub fn mute_idle_timeout(&self) -> Option<Duration> {
        (self.mute_idle_timeout_secs > 0).then(|| Duration::from_secs(self.mute_idle_timeout_secs))
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("AirType"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("airtype"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("AirType")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("airtype-config-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn test_default_config_is_lan_on_port_5000() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.general.mode, Mode::Lan);
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.lan.bind_address, "0.0.0.0");
        assert_eq!(cfg.lan.port, 5000);
        assert_eq!(cfg.lan.mute_idle_timeout(), Some(Duration::from_secs(120)));
        assert!(cfg.paste.use_secondary_combo);
        assert!(!cfg.paste.preserve_clipboard);
        assert!(cfg.relay.url.is_empty());
    }

    #[test]
    fn test_empty_file_parses_to_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        // Arrange
        let text = r#"
            [general]
            mode = "relay"

            [relay]
            url = "https://relay.example.com"
        "#;

        // Act
        let cfg: AppConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.general.mode, Mode::Relay);
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.relay.url, "https://relay.example.com");
        assert_eq!(cfg.relay.password, "");
        assert_eq!(cfg.lan.port, 5000);
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        let result: Result<AppConfig, _> = toml::from_str("[general]\nmode = \"bluetooth\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_socket_addr_joins_ipv4_host_and_port() {
        let lan = LanConfig {
            bind_address: "127.0.0.1".into(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(lan.socket_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn test_socket_addr_accepts_bare_and_bracketed_ipv6() {
        // Arrange
        let bare = LanConfig {
            bind_address: "::".into(),
            port: 5000,
            ..Default::default()
        };
        let bracketed = LanConfig {
            bind_address: "[::1]".into(),
            port: 5000,
            ..Default::default()
        };

        // Act
        let bare_addr = bare.socket_addr().unwrap();
        let bracketed_addr = bracketed.socket_addr().unwrap();

        // Assert
        assert_eq!(bare_addr.to_string(), "[::]:5000");
        assert_eq!(bracketed_addr.to_string(), "[::1]:5000");
    }

    #[test]
    fn test_zero_mute_idle_timeout_disables_release() {
        // Arrange
        let text = "[lan]\nmute_idle_timeout_secs = 0\n";

        // Act
        let cfg: AppConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.lan.mute_idle_timeout(), None);
        assert_eq!(cfg.lan.port, 5000);
    }

    #[test]
    fn test_socket_addr_rejects_hostnames() {
        let lan = LanConfig {
            bind_address: "localhost".into(),
            port: 5000,
            ..Default::default()
        };
        assert!(lan.socket_addr().is_err());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = temp_path("missing");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_then_load_preserves_settings() {
        // Arrange
        let path = temp_path("save");
        let mut cfg = AppConfig::default();
        cfg.general.mode = Mode::Relay;
        cfg.relay.password = "secret".into();
        cfg.paste.preserve_clipboard = true;

        // Act
        save_config(&path, &cfg).unwrap();
        let loaded = load_config(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let path = temp_path("malformed");
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(&path, "[lan\nport = ").unwrap();

        let result = load_config(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
