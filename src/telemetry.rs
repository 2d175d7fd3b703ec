//! Telemetry sampling for Galvani
//!
//! Builds the backend log entries and the realtime `soc_update` payloads
//! from a state snapshot taken by the coordinator. Values are rounded here,
//! at the reporting boundary; the session accumulators stay unrounded.

use crate::backend::{DockLogRequest, LogState};
use crate::config::DockConfig;
use crate::engine::round2;
use chrono::{DateTime, Utc};

/// One sampled telemetry point
#[derive(Debug, Clone, Copy)]
pub struct TelemetrySample {
    /// State of charge in percent
    pub soc: f64,

    /// Session energy so far, when specs are known
    pub session_energy_kwh: Option<f64>,

    /// Estimated charging power, when a fresh estimate exists
    pub power_kw: Option<f64>,

    /// Sample wall-clock time
    pub sampled_at: DateTime<Utc>,
}

/// SOC as a whole percent, clamped to [0, 100]
pub fn soc_percent(soc: f64) -> i64 {
    soc.clamp(0.0, 100.0).round() as i64
}

/// Backend log entry for an active charging session
pub fn charging_log(dock: &DockConfig, sample: &TelemetrySample) -> DockLogRequest {
    DockLogRequest {
        dock_id: dock.id,
        secret_key: dock.secret_key.clone(),
        sample_at: sample.sampled_at.to_rfc3339(),
        soc_percent: soc_percent(sample.soc),
        state: LogState::Charging,
        power_kw: sample.power_kw.map(round2),
        session_energy_kwh: sample.session_energy_kwh.map(round2),
    }
}

/// Final backend log entry sent at completion
pub fn parking_log(dock: &DockConfig, sample: &TelemetrySample) -> DockLogRequest {
    DockLogRequest {
        dock_id: dock.id,
        secret_key: dock.secret_key.clone(),
        sample_at: sample.sampled_at.to_rfc3339(),
        soc_percent: soc_percent(sample.soc),
        state: LogState::Parking,
        power_kw: sample.power_kw.map(round2),
        session_energy_kwh: sample.session_energy_kwh.map(round2),
    }
}

/// Realtime `soc_update` payload; optional fields are omitted when unknown
pub fn soc_update(sample: &TelemetrySample) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "soc": round2(sample.soc),
        "timestamp": sample.sampled_at.to_rfc3339(),
    });
    if let Some(power_kw) = sample.power_kw {
        payload["powerKw"] = serde_json::json!(round2(power_kw));
    }
    if let Some(energy_kwh) = sample.session_energy_kwh {
        payload["energyKwh"] = serde_json::json!(round2(energy_kwh));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dock() -> DockConfig {
        DockConfig {
            id: 3,
            secret_key: "secret".to_string(),
        }
    }

    fn sample() -> TelemetrySample {
        TelemetrySample {
            soc: 45.678,
            session_energy_kwh: Some(1.2345),
            power_kw: Some(42.4999),
            sampled_at: Utc::now(),
        }
    }

    #[test]
    fn soc_percent_rounds_and_clamps() {
        assert_eq!(soc_percent(45.4), 45);
        assert_eq!(soc_percent(45.5), 46);
        assert_eq!(soc_percent(-2.0), 0);
        assert_eq!(soc_percent(104.0), 100);
    }

    #[test]
    fn charging_log_rounds_at_the_boundary() {
        let log = charging_log(&dock(), &sample());
        assert_eq!(log.state, LogState::Charging);
        assert_eq!(log.soc_percent, 46);
        assert_eq!(log.session_energy_kwh, Some(1.23));
        assert_eq!(log.power_kw, Some(42.5));
    }

    #[test]
    fn parking_log_carries_session_energy() {
        let log = parking_log(&dock(), &sample());
        assert_eq!(log.state, LogState::Parking);
        assert_eq!(log.session_energy_kwh, Some(1.23));
    }

    #[test]
    fn soc_update_omits_unknown_fields() {
        let minimal = TelemetrySample {
            soc: 50.0,
            session_energy_kwh: None,
            power_kw: None,
            sampled_at: Utc::now(),
        };
        let payload = soc_update(&minimal);
        assert_eq!(payload["soc"], 50.0);
        assert!(payload.get("powerKw").is_none());
        assert!(payload.get("energyKwh").is_none());

        let full = soc_update(&sample());
        assert_eq!(full["powerKw"], 42.5);
        assert_eq!(full["energyKwh"], 1.23);
    }
}
