//! Process configuration, loaded once from a JSON file at startup.
//!
//! Field names and nesting mirror the original `config.json` schema exactly
//! (`server`, `simulation`, `physics`), so an operator's existing config file
//! works unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_port: String,
    pub map_file: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub server_url: String,
    pub num_cars: u32,
    pub spawn_rate: f64,
    pub report_interval: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub car_length_km: f64,
    pub density_threshold: f64,
    #[serde(rename = "edge_density")]
    pub edge_density_threshold: f64,
    pub speed_factor: f64,
    pub alpha: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub simulation: SimulationConfig,
    pub physics: PhysicsConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    /// Load and parse a config file. Any failure is treated as fatal by
    /// callers — there is no partial-startup fallback.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        Ok(config)
    }
}
