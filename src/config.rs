use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub classifier_path: PathBuf,
    pub regressor_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            classifier_path: PathBuf::from("classifier.safetensors"),
            regressor_path: PathBuf::from("regressor.safetensors"),
        }
    }
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load from an explicit path, else `<config_dir>/stressmate/config.toml`,
/// else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(Config::default());
    };

    let config_path = config_dir.join("stressmate").join("config.toml");
    if !config_path.exists() {
        return Ok(Config::default());
    }

    read_config(&config_path)
}

fn read_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
