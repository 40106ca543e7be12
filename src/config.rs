//! Runtime configuration, optionally loaded from a TOML file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Overpass API endpoint.
    pub overpass_url: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Directory for the filesystem cache.
    pub cache_dir: PathBuf,
    /// Skip all network activity; only cached data is used.
    pub offline: bool,
    /// Per-request timeout in seconds (also the Overpass server-side budget).
    pub timeout_s: u64,
    /// Attempts per request before giving up.
    pub max_retries: u32,
    /// Pause after every successful network fetch, in seconds.
    pub cooldown_s: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            user_agent: "OSM-Mapper".to_string(),
            cache_dir: PathBuf::from("osm_cache"),
            offline: false,
            timeout_s: 180,
            max_retries: 5,
            cooldown_s: 2,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.cooldown_s, 2);
        assert!(!config.offline);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "offline = true\ncache_dir = \"/tmp/laurel-cache\"").unwrap();
        let config = Config::load_from_file(file.path()).unwrap();
        assert!(config.offline);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/laurel-cache"));
        assert_eq!(config.timeout_s, 180);
    }
}
