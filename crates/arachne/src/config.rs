//! Client configuration.
//!
//! Config lives at `.config/arachne/config.json` relative to the working
//! directory. Every field has a default, so a missing file at the default
//! location is fine; an explicitly named file that doesn't exist is an
//! error.

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the Arachne server.
    pub server_url: String,

    /// Interval between polls while a case is busy, in milliseconds.
    pub poll_interval_ms: u64,

    /// Default significance level for chain display.
    pub sig_level: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: "http://localhost:8080".to_string(),
            poll_interval_ms: 1000,
            sig_level: arachne_core::DEFAULT_SIG_LEVEL,
        }
    }
}

impl Config {
    /// Default config file location, relative to the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(".config/arachne/config.json")
    }

    /// Load from `path`, or from the default location when `path` is
    /// `None`. Only an explicitly given path is required to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::read(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_default_config_falls_back_to_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/config.json"))).is_err());
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"serverUrl": "http://sim.example:9000"}}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server_url, "http://sim.example:9000");
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.sig_level, arachne_core::DEFAULT_SIG_LEVEL);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url =").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }
}
