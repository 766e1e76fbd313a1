//! Settings of the `spellcard` tool, read from an optional YAML file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_ENV: &str = "SPELLCARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// A page URL must start with one of these.
    pub allowed_prefixes: Vec<String>,
    pub timeout_secs: u64,
    /// Extra attempts after a transient fetch failure.
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further one.
    pub retry_delay_ms: u64,
    pub user_agent: String,
    /// Abbreviate values to save space on the card.
    pub compact: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            allowed_prefixes: vec![
                "https://aonprd.com/".to_owned(),
                "https://www.aonprd.com/".to_owned(),
            ],
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 500,
            user_agent: concat!("spellcard/", env!("CARGO_PKG_VERSION")).to_owned(),
            compact: false,
        }
    }
}

impl Config {
    /// Reads `path`, or returns the defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Config, Error> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Config::default()),
        };
        let text = std::fs::read_to_string(path)?;
        let config = Config::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Config, Error> {
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
