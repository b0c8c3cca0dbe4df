//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_ENV_VAR: &str = "INNOVATOR_CONFIG_PATH";

/// Configuration for innovator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the idea service
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("innovator")
    }

    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV_VAR) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file; problems are reported and defaults used
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            base_url: Some(innovator_api::endpoint::DEV_BASE_URL.to_string()),
            timeout_secs: Some(innovator_api::client::DEFAULT_TIMEOUT.as_secs()),
            tui: Some(true),
        };

        default_config.save()?;
        Ok(path)
    }
}

pub fn example_config() -> &'static str {
    r#"# innovator configuration file
# Place at ~/.config/innovator/config.toml (Linux), or point
# INNOVATOR_CONFIG_PATH at another file

# Base URL of the idea service (INNOVATOR_API_BASE_URL and --base-url win)
base_url = "http://localhost:8000"

# Request timeout in seconds; generation ranks many candidates and is slow
timeout_secs = 120

# Whether to use TUI mode by default (true by default)
# Set to false for a line-oriented prompt
tui = true
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(example_config()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.timeout_secs, Some(120));
        assert_eq!(config.tui, Some(true));
    }

    #[test]
    fn test_missing_keys_default() {
        let config = Config::parse("tui = false").unwrap();
        assert_eq!(config.base_url, None);
        assert_eq!(config.tui, Some(false));
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_config_rejected() {
        assert!(Config::parse("timeout_secs = \"soon\"").is_err());
    }
}
