//! Daemon configuration.
//!
//! Read from `$XDG_CONFIG_HOME/cruise/cruised.toml` when present:
//!
//! ```toml
//! socket_path = "/run/user/1000/cruise.sock"
//! snapshot_path = "/var/lib/cruise/cabins.json"
//! log_filter = "cruised=debug"
//! ```
//!
//! Every key is optional. `CRUISE_SOCKET` and `CRUISE_SNAPSHOT` override the
//! file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::server::DEFAULT_SOCKET_PATH;

pub const SOCKET_ENV: &str = "CRUISE_SOCKET";
pub const SNAPSHOT_ENV: &str = "CRUISE_SNAPSHOT";

const CONFIG_DIR: &str = "cruise";
const CONFIG_FILE: &str = "cruised.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Unix socket the daemon listens on.
    pub socket_path: PathBuf,

    /// Cabin snapshot loaded at startup and written at shutdown.
    pub snapshot_path: Option<PathBuf>,

    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            snapshot_path: None,
            log_filter: None,
        }
    }
}

impl DaemonConfig {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Parses a config file.
    ///
    /// # Errors
    ///
    /// `ConfigError::Read` if the file cannot be read, `ConfigError::Parse`
    /// for invalid TOML or unknown keys.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads `path` (or the default location), then applies environment overrides.
    ///
    /// A missing file means defaults.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::from_file`] for a file that exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(ref p) if p.exists() => Self::from_file(p)?,
            _ => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `CRUISE_SOCKET` / `CRUISE_SNAPSHOT` as returned by `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(socket) = non_empty(SOCKET_ENV) {
            self.socket_path = PathBuf::from(socket);
        }
        if let Some(snapshot) = non_empty(SNAPSHOT_ENV) {
            self.snapshot_path = Some(PathBuf::from(snapshot));
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
