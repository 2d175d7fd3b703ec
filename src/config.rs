//! Configuration management for Galvani
//!
//! This module handles loading, validation, and management of the dock
//! configuration from YAML files with environment variable overrides for
//! the deployment identity.

use crate::error::{GalvaniError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dock identity used against the backend
    pub dock: DockConfig,

    /// Backend API configuration
    pub backend: BackendConfig,

    /// Vehicle gateway listener configuration
    pub gateway: GatewayConfig,

    /// Charging simulation and reporting cadence
    pub charging: ChargingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Dock identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Dock ID assigned by the backend
    pub id: i64,

    /// Shared secret used for handshake, ping and log requests
    pub secret_key: String,
}

/// Backend API connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g. `https://backend.example.com`)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Vehicle gateway listener parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

/// Charging simulation and reporting cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingConfig {
    /// Power tick interval in milliseconds; also the simulated seconds per
    /// tick (interval/1000) so energy delivery tracks wall time
    pub tick_interval_ms: u64,

    /// Telemetry/log tick interval in milliseconds
    pub telemetry_interval_ms: u64,

    /// Realtime heartbeat interval in seconds
    pub heartbeat_interval_seconds: u64,

    /// Backend keep-alive ping interval in seconds
    pub ping_interval_seconds: u64,

    /// How long the last positive power estimate is held over gaps, seconds
    pub power_hold_seconds: f64,

    /// Target SOC used when a start request carries none
    pub default_target_soc: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (or directory for rotated files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    #[serde(default = "default_true")]
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default locations, falling back to
    /// defaults when no file exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "galvani_config.yaml",
            "/data/galvani_config.yaml",
            "/etc/galvani/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides for the deployment identity
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("GALVANI_DOCK_ID")
            && let Ok(parsed) = id.trim().parse::<i64>()
        {
            self.dock.id = parsed;
        }
        if let Ok(secret) = std::env::var("GALVANI_DOCK_SECRET")
            && !secret.is_empty()
        {
            self.dock.secret_key = secret;
        }
        if let Ok(url) = std::env::var("GALVANI_BACKEND_URL")
            && !url.is_empty()
        {
            self.backend.base_url = url;
        }
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(GalvaniError::validation(
                "backend.base_url",
                "must not be empty",
            ));
        }
        if self.backend.timeout_seconds == 0 {
            return Err(GalvaniError::validation(
                "backend.timeout_seconds",
                "must be greater than 0",
            ));
        }
        if self.charging.tick_interval_ms == 0 {
            return Err(GalvaniError::validation(
                "charging.tick_interval_ms",
                "must be greater than 0",
            ));
        }
        if self.charging.telemetry_interval_ms == 0 {
            return Err(GalvaniError::validation(
                "charging.telemetry_interval_ms",
                "must be greater than 0",
            ));
        }
        if self.charging.heartbeat_interval_seconds == 0 {
            return Err(GalvaniError::validation(
                "charging.heartbeat_interval_seconds",
                "must be greater than 0",
            ));
        }
        if self.charging.ping_interval_seconds == 0 {
            return Err(GalvaniError::validation(
                "charging.ping_interval_seconds",
                "must be greater than 0",
            ));
        }
        if self.charging.power_hold_seconds < 0.0 {
            return Err(GalvaniError::validation(
                "charging.power_hold_seconds",
                "must not be negative",
            ));
        }
        if !(self.charging.default_target_soc > 0.0 && self.charging.default_target_soc <= 100.0) {
            return Err(GalvaniError::validation(
                "charging.default_target_soc",
                "must be in (0, 100]",
            ));
        }
        if self.gateway.host.trim().is_empty() {
            return Err(GalvaniError::validation("gateway.host", "must not be empty"));
        }
        Ok(())
    }

    /// Power tick length in simulated seconds
    pub fn tick_seconds(&self) -> f64 {
        self.charging.tick_interval_ms as f64 / 1000.0
    }
}
