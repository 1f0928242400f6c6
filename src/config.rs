//! # Configuration Module
//!
//! This module handles the user configuration file for volctl: which Volumio
//! host to talk to, which radio series exist, and how album search results are
//! scoped.
//!
//! ## File Location
//!
//! The configuration lives in the platform configuration directory:
//! - Linux: `~/.config/volctl/config.yaml`
//! - macOS: `~/Library/Application Support/volctl/config.yaml`
//! - Windows: `%APPDATA%\volctl\config.yaml`
//!
//! ## Format
//!
//! ```yaml
//! host: volumio.local
//! radio:
//!   asot:
//!     name: A State of Trance
//!     search_query: A State of Trance
//!     pattern: '^A State [Oo]f Trance \d+'
//! ```
//!
//! A missing file is not an error: defaults are used. An unreadable or
//! malformed file is.

use crate::volumio_client::{AlbumScope, DEFAULT_HOST};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no host is configured.
pub const HOST_ENV_VAR: &str = "VOLUMIO_HOST";

/// One radio series: how to find its episodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioSeries {
    /// Display name, e.g. "A State of Trance"
    #[serde(default)]
    pub name: String,
    /// Query passed to the library search
    pub search_query: String,
    /// Regex an album name must match to count as an episode
    pub pattern: String,
}

/// Contents of `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Volumio hostname or IP, empty when unset
    #[serde(default)]
    pub host: String,
    /// Which search results count as local albums
    #[serde(default)]
    pub library: AlbumScope,
    /// Radio series keyed by the name used on the command line
    #[serde(default)]
    pub radio: BTreeMap<String, RadioSeries>,
}

impl Config {
    /// Default configuration plus one example series, used by `config init`.
    pub fn example() -> Self {
        let mut config = Self {
            host: DEFAULT_HOST.to_string(),
            ..Self::default()
        };
        config.radio.insert(
            "asot".to_string(),
            RadioSeries {
                name: "A State of Trance".to_string(),
                search_query: "A State of Trance".to_string(),
                pattern: r"^A State [Oo]f Trance \d+".to_string(),
            },
        );
        config
    }

    /// Looks up a series by its command-line key.
    pub fn series(&self, key: &str) -> Option<&RadioSeries> {
        self.radio.get(key)
    }

    /// Picks the host to talk to.
    ///
    /// Precedence: explicit flag, then the config file, then `$VOLUMIO_HOST`,
    /// then `volumio.local`. Empty values are skipped.
    pub fn resolve_host(&self, flag: Option<&str>, env: Option<&str>) -> String {
        [flag, Some(self.host.as_str()), env]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|host| !host.is_empty())
            .unwrap_or(DEFAULT_HOST)
            .to_string()
    }
}

/// Returns the platform-appropriate configuration file path.
///
/// # Errors
///
/// Returns an error if the system configuration directory cannot be determined.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system configuration directory. Please pass --config explicitly."
        )
    })?;

    Ok(config_dir.join("volctl").join("config.yaml"))
}

/// Loads the configuration from `path`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed. A file
/// that does not exist yields the default configuration.
pub fn load_from(path: &Path) -> Result<Config> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => {
            return Err(err).with_context(|| {
                format!("Failed to read config file at {}", path.display())
            })
        }
    };

    // An empty file is a valid "nothing configured".
    if data.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))
}

/// Writes the configuration to `path`, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create config directory at {}. Please check file permissions.",
                parent.display()
            )
        })?;
    }

    let data = serde_yaml::to_string(config).context("Failed to serialize config")?;
    fs::write(path, data)
        .with_context(|| format!("Failed to write config file at {}", path.display()))
}
