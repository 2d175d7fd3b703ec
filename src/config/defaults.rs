use super::*;

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            id: 0,
            secret_key: String::new(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_seconds: 15,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for ChargingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            telemetry_interval_ms: 1000,
            heartbeat_interval_seconds: 10,
            ping_interval_seconds: 10,
            power_hold_seconds: 3.0,
            default_target_soc: 100.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/galvani.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dock: DockConfig::default(),
            backend: BackendConfig::default(),
            gateway: GatewayConfig::default(),
            charging: ChargingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
