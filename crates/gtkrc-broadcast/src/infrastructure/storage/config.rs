//! TOML-based configuration for gtkrc-broadcast.
//!
//! Reads `BroadcastConfig` from `~/.config/gtkrc-broadcast/config.toml`
//! (honouring `XDG_CONFIG_HOME`) or from an explicit path.  The file is
//! optional: without it the program behaves exactly as when run with no
//! arguments.
//!
//! ```toml
//! [display]
//! name = ":0"
//! synchronous = false
//! all_screens = false
//!
//! [broadcast]
//! signals = ["rc-files", "icon-themes"]
//!
//! [logging]
//! level = "warn"
//! ```
//!
//! Every field has a serde default, so partial files and empty sections are
//! accepted.

use std::path::{Path, PathBuf};

use gtkrc_core::ReloadSignal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::broadcast_reload::{BroadcastOptions, ScreenScope};
use crate::infrastructure::display::DisplayOptions;

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

    /// `[broadcast] signals` is present but empty.
    #[error("config at {path} lists no signals to broadcast")]
    NoSignals { path: PathBuf },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BroadcastConfig {
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub broadcast: BroadcastSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Which display to talk to and how.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DisplaySection {
    /// X display name; absent means `$DISPLAY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Make X requests synchronous.
    #[serde(default)]
    pub synchronous: bool,
    /// Broadcast on every screen instead of only the default one.
    #[serde(default)]
    pub all_screens: bool,
}

/// What to broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BroadcastSection {
    #[serde(default = "default_signals")]
    pub signals: Vec<ReloadSignal>,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// `tracing` filter directive, e.g. `"warn"` or `"gtkrc_broadcast=debug"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_signals() -> Vec<ReloadSignal> {
    vec![ReloadSignal::RcFiles]
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for BroadcastSection {
    fn default() -> Self {
        Self {
            signals: default_signals(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl BroadcastConfig {
    /// Connection settings for [`open_display`](crate::infrastructure::display::open_display).
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            name: self.display.name.clone(),
            synchronous: self.display.synchronous,
        }
    }

    /// Use case options; `dry_run` is a per-invocation choice, not a setting.
    pub fn broadcast_options(&self, dry_run: bool) -> BroadcastOptions {
        BroadcastOptions {
            scope: if self.display.all_screens {
                ScreenScope::All
            } else {
                ScreenScope::Default
            },
            dry_run,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if neither `XDG_CONFIG_HOME`
/// nor `HOME` is set.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration.
///
/// With `Some(path)` the file must exist.  With `None` the default location is
/// used and a missing file (or an undeterminable config directory) yields
/// `BroadcastConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors,
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::NoSignals`] if the file lists no signals.
pub fn load_config(explicit: Option<&Path>) -> Result<BroadcastConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => match config_file_path() {
            Ok(path) => match read_config(&path) {
                Err(ConfigError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    Ok(BroadcastConfig::default())
                }
                other => other,
            },
            Err(_) => Ok(BroadcastConfig::default()),
        },
    }
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read,
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::NoSignals`] if it sets an empty signal list.
pub fn read_config(path: &Path) -> Result<BroadcastConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BroadcastConfig = toml::from_str(&content)?;
    if config.broadcast.signals.is_empty() {
        return Err(ConfigError::NoSignals {
            path: path.to_path_buf(),
        });
    }
    Ok(config)
}

/// XDG_CONFIG_HOME or ~/.config, plus the application directory.
fn platform_config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("gtkrc-broadcast"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
