use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error_handling::types::ConfigError;

fn default_status_log() -> PathBuf {
    PathBuf::from("/var/log/openvpn-status.log")
}

fn default_session_log() -> PathBuf {
    PathBuf::from("/var/log/openvpn-sessions.csv")
}

/// Runtime configuration: where the live status feed is read from and
/// where the session log lives.
///
/// There is no implicit global state; the paths are resolved once at
/// startup (file, then flag/env overrides) and handed to the controller,
/// so tests can point everything at a temp directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Status file written by the OpenVPN server (`status` directive).
    #[serde(default = "default_status_log")]
    pub status_log: PathBuf,

    /// CSV session log maintained by this tool.
    #[serde(default = "default_session_log")]
    pub session_log: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_log: default_status_log(),
            session_log: default_session_log(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Missing keys fall back to
    /// the defaults; unknown keys are rejected.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    /// Apply command-line / environment overrides on top of whatever the
    /// file (or the defaults) provided.
    pub fn apply_overrides(
        &mut self,
        status_log: Option<PathBuf>,
        session_log: Option<PathBuf>,
    ) {
        if let Some(path) = status_log {
            self.status_log = path;
        }
        if let Some(path) = session_log {
            self.session_log = path;
        }
    }
}
