//! Per-instance configuration, loaded from an optional TOML file with
//! field-by-field defaults.

use crate::error::ConfigError;
use crate::types::CaWidth;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub asdu_addr: u16,
    pub link_address: u8,
    pub common_address_width: CaWidth,
    pub background_scan: bool,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4001,
            asdu_addr: 1,
            link_address: 1,
            common_address_width: CaWidth::default(),
            background_scan: true,
            max_connections: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    pub discrete_start: u32,
    pub discrete_count: u32,
    pub measured_start: u32,
    pub measured_count: u32,
    pub min_update_secs: f64,
    pub max_update_secs: f64,
    pub timezone_offset_secs: i64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            discrete_start: 1,
            discrete_count: 48,
            measured_start: 1001,
            measured_count: 32,
            min_update_secs: 5.0,
            max_update_secs: 300.0,
            timezone_offset_secs: 3 * 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GrinderConfig {
    pub enabled: bool,
    pub probability: u8,
}

impl Default for GrinderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub points: PointsConfig,
    pub grinder: GrinderConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file doesn't specify.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}
