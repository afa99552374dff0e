//! Agent configuration: a small JSON file read once at startup.
//!
//! ```json
//! { "URL": "http://collector:8080/nodes", "WaitTime": 60 }
//! ```
//!
//! `NODEINFO_AGENT_URL` and `NODEINFO_AGENT_WAIT_TIME` override the file.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "conf.json";
pub const CONFIG_PATH_ENV: &str = "NODEINFO_AGENT_CONFIG";
const URL_ENV: &str = "NODEINFO_AGENT_URL";
const WAIT_TIME_ENV: &str = "NODEINFO_AGENT_WAIT_TIME";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "URL", default)]
    pub url: String,
    /// Seconds between cycles; zero or negative runs a single cycle.
    #[serde(rename = "WaitTime", default)]
    pub wait_time: i64,
}

impl Configuration {
    /// `None` means single-shot.
    pub fn interval(&self) -> Option<Duration> {
        u64::try_from(self.wait_time)
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the file, falling back to the zero configuration on any error,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Self {
        let mut cfg = Self::from_file(path).unwrap_or_else(|e| {
            warn!("{e}; continuing with empty configuration");
            Self::default()
        });
        cfg.apply_overrides(|k| std::env::var(k).ok());
        cfg
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get(URL_ENV).filter(|v| !v.is_empty()) {
            self.url = url;
        }
        if let Some(raw) = get(WAIT_TIME_ENV) {
            match raw.trim().parse() {
                Ok(secs) => self.wait_time = secs,
                Err(_) => warn!("ignoring {WAIT_TIME_ENV}={raw:?}: not an integer"),
            }
        }
    }
}

/// `--config` beats `NODEINFO_AGENT_CONFIG` beats `./conf.json`.
pub fn resolve_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
