//! Configuration for cueplay
//!
//! Bootstrap configuration comes from an optional TOML file plus command-line
//! overrides. There is no runtime-mutable configuration; queue and playback
//! state live only in memory.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5750;

/// Default oversize-advisory threshold (5 MiB of encoded payload)
pub const DEFAULT_ADVISORY_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Bootstrap configuration loaded from a TOML file
///
/// These settings cannot change during runtime; restart to pick up changes.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Oversize-advisory policy for lazily loaded audio
    #[serde(default)]
    pub advisory: AdvisoryConfig,

    /// How resolved tracks are delivered to the player
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Policy for the non-fatal oversize advisory attached to large loads
///
/// Both the eager and lazy revisions of this design exist in the wild; the
/// advisory is a policy knob rather than a hardcoded behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryConfig {
    /// Whether to attach the advisory at all
    #[serde(default = "default_advisory_enabled")]
    pub enabled: bool,

    /// Payload size above which the advisory is attached, in bytes
    #[serde(default = "default_advisory_threshold")]
    pub threshold_bytes: u64,
}

/// How resolved tracks are delivered to the player
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    /// Delivery mode for resolved sources
    #[serde(default)]
    pub mode: SourceMode,
}

/// Source delivery mode
///
/// `data_url` embeds the audio bytes in a base64 data URL; `stream` points
/// the player at the byte-range endpoint and leaves the bytes on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    #[default]
    DataUrl,
    Stream,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_advisory_enabled() -> bool {
    true
}

fn default_advisory_threshold() -> u64 {
    DEFAULT_ADVISORY_THRESHOLD
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_advisory_enabled(),
            threshold_bytes: default_advisory_threshold(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            advisory: AdvisoryConfig::default(),
            source: SourceConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
            },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load from an optional file, falling back to built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_no_file_given() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.advisory.enabled);
        assert_eq!(config.advisory.threshold_bytes, DEFAULT_ADVISORY_THRESHOLD);
        assert_eq!(config.source.mode, SourceMode::DataUrl);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_stream_source_mode() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nmode = \"stream\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.mode, SourceMode::Stream);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\n\n[advisory]\nenabled = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.advisory.enabled);
        // Unset fields keep their defaults
        assert_eq!(config.advisory.threshold_bytes, DEFAULT_ADVISORY_THRESHOLD);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Config::load(Path::new("/nonexistent/cueplay.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
