use serde::Deserialize;
use std::path::PathBuf;

use crate::record::DEFAULT_RECORD_FILE;

pub const DEFAULT_PORT: u16 = 8013;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub record_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            record_path: PathBuf::from(DEFAULT_RECORD_FILE),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
