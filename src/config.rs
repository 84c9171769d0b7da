//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the floodwatch.toml file.
//! It configures the upstream flood-monitoring API and the address the boundary
//! server listens on.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file, overridden by the `FLOODWATCH_CONFIG` environment variable
pub const DEFAULT_CONFIG_PATH: &str = "floodwatch.toml";

/// Application configuration loaded from floodwatch.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Upstream flood-monitoring API
    pub api: ApiConfig,
    /// HTTP boundary settings
    pub server: ServerConfig,
}

/// Environment Agency flood-monitoring API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Stations collection URL; readings live under `<base_url>/<ref>/readings`
    pub base_url: String,
    /// `_limit` for the station list
    pub stations_limit: u32,
    /// `_limit` for a station's readings (100 ≈ 24 h of 15-minute samples)
    pub readings_limit: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Boundary server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "127.0.0.1:3000"
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "https://environment.data.gov.uk/flood-monitoring/id/stations"
                    .to_string(),
                stations_limit: 100,
                readings_limit: 100,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_addr: "127.0.0.1:3000".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from `$FLOODWATCH_CONFIG` or floodwatch.toml.
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        let path =
            std::env::var("FLOODWATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config file format in {}: {}", path.display(), e);
                    log::warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "No config file at {}, using default configuration",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Write this configuration as pretty TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
