//! Session state for a single vehicle visit
//!
//! A `DockSession` is created when a vehicle connects and the backend
//! handshake succeeds, populated incrementally (configuration, start,
//! charging) and reset to defaults on completion, interruption, or
//! handshake failure. The coordinator is the only component that mutates
//! it; everything else receives snapshots.

use crate::engine::PowerEstimator;
use serde::Deserialize;
use std::time::Instant;

/// Dock lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockPhase {
    /// No vehicle connected, slot free
    Idle,

    /// Vehicle connected, backend handshake in progress
    Handshaking,

    /// Handshake complete, waiting for configuration / start
    Ready,

    /// Charging simulation running
    Charging,

    /// Completion reconciliation in progress
    Completing,
}

/// Single-flight guard for the completion procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// No completion triggered yet
    Idle,

    /// Completion reconciliation is running
    InFlight,

    /// Completion already performed for this session
    Done,
}

/// Battery configuration supplied by the vehicle
#[derive(Debug, Clone, Copy)]
pub struct VehicleSpec {
    /// Current battery charge in kWh
    pub current_capacity_kwh: f64,

    /// Battery capacity in kWh
    pub max_capacity_kwh: f64,
}

impl VehicleSpec {
    /// First violated configuration rule, if any
    pub fn violation(&self) -> Option<&'static str> {
        if self.max_capacity_kwh <= 0.0 {
            Some("maxCapacity must be greater than 0")
        } else if self.current_capacity_kwh < 0.0 {
            Some("batteryCapacity cannot be negative")
        } else if self.current_capacity_kwh > self.max_capacity_kwh {
            Some("batteryCapacity cannot exceed maxCapacity")
        } else {
            None
        }
    }

    /// State of charge in percent
    pub fn soc(&self) -> f64 {
        if self.max_capacity_kwh > 0.0 {
            (self.current_capacity_kwh / self.max_capacity_kwh) * 100.0
        } else {
            0.0
        }
    }
}

/// Charger parameters from the handshake payload
#[derive(Debug, Clone, Copy)]
pub struct ChargerSpec {
    /// Rated charger power in kW
    pub power_kw: f64,

    /// Price per kWh used as the completion price override
    pub price_per_kwh: Option<f64>,
}

/// Vehicle portion of a `session_specs` channel payload
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecVehicle {
    pub battery_capacity_kwh: f64,
    pub max_power_kw: f64,
}

/// Charger portion of a `session_specs` channel payload
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecCharger {
    pub power_kw: f64,
}

/// Session specs delivered over the realtime channel.
///
/// Used by the power estimator to bound its estimates; receiving a new
/// payload resets the accumulated estimation trace.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSpecs {
    #[serde(default)]
    pub session_id: Option<i64>,

    pub vehicle: SpecVehicle,

    pub charger: SpecCharger,

    #[serde(default)]
    pub initial_soc: Option<f64>,

    #[serde(default)]
    pub target_soc: Option<f64>,
}

impl SessionSpecs {
    /// Effective power cap: the weaker of vehicle and charger limits
    pub fn power_cap_kw(&self) -> f64 {
        crate::engine::power_cap(self.charger.power_kw, Some(self.vehicle.max_power_kw))
    }
}

/// Per-visit session context, owned exclusively by the coordinator
#[derive(Debug)]
pub struct DockSession {
    /// Session ID issued by the backend at handshake
    pub session_id: Option<i64>,

    /// Realtime channel ID issued at handshake
    pub channel_id: Option<String>,

    /// Bearer token for the session endpoints
    pub dock_token: Option<String>,

    /// Join code displayed to the driver
    pub join_code: Option<String>,

    /// Charger parameters from the handshake payload
    pub charger: Option<ChargerSpec>,

    /// Battery configuration from `car_configure`
    pub vehicle: Option<VehicleSpec>,

    /// Session specs from the realtime channel
    pub specs: Option<SessionSpecs>,

    /// Target state of charge in percent
    pub target_soc: f64,

    /// Energy delivered this session, monotone
    pub session_charged_kwh: f64,

    /// Set once when charging begins
    pub session_start: Option<Instant>,

    /// Power-hold smoothing state for telemetry estimates
    pub estimator: PowerEstimator,

    /// Completion single-flight guard
    pub completion: CompletionState,
}

impl DockSession {
    /// Create an empty session with the given power-hold window
    pub fn new(power_hold_seconds: f64) -> Self {
        Self {
            session_id: None,
            channel_id: None,
            dock_token: None,
            join_code: None,
            charger: None,
            vehicle: None,
            specs: None,
            target_soc: 0.0,
            session_charged_kwh: 0.0,
            session_start: None,
            estimator: PowerEstimator::new(power_hold_seconds),
            completion: CompletionState::Idle,
        }
    }

    /// Current state of charge in percent, 0 when unconfigured
    pub fn soc(&self) -> f64 {
        self.vehicle.map(|v| v.soc()).unwrap_or(0.0)
    }

    /// Whole seconds since charging started, 0 when it never did
    pub fn duration_seconds(&self) -> u64 {
        self.session_start.map(|s| s.elapsed().as_secs()).unwrap_or(0)
    }

    /// Reset all fields to defaults for the next visit
    pub fn reset(&mut self) {
        self.session_id = None;
        self.channel_id = None;
        self.dock_token = None;
        self.join_code = None;
        self.charger = None;
        self.vehicle = None;
        self.specs = None;
        self.target_soc = 0.0;
        self.session_charged_kwh = 0.0;
        self.session_start = None;
        self.estimator.reset();
        self.completion = CompletionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_spec_validation_rules() {
        let ok = VehicleSpec {
            current_capacity_kwh: 10.0,
            max_capacity_kwh: 50.0,
        };
        assert!(ok.violation().is_none());

        let bad_max = VehicleSpec {
            current_capacity_kwh: 0.0,
            max_capacity_kwh: 0.0,
        };
        assert_eq!(bad_max.violation(), Some("maxCapacity must be greater than 0"));

        let negative = VehicleSpec {
            current_capacity_kwh: -1.0,
            max_capacity_kwh: 50.0,
        };
        assert_eq!(negative.violation(), Some("batteryCapacity cannot be negative"));

        let over = VehicleSpec {
            current_capacity_kwh: 60.0,
            max_capacity_kwh: 50.0,
        };
        assert_eq!(over.violation(), Some("batteryCapacity cannot exceed maxCapacity"));
    }

    #[test]
    fn soc_handles_unconfigured_battery() {
        let spec = VehicleSpec {
            current_capacity_kwh: 100.0,
            max_capacity_kwh: 200.0,
        };
        assert!((spec.soc() - 50.0).abs() < f64::EPSILON);

        let session = DockSession::new(3.0);
        assert!(session.soc().abs() < f64::EPSILON);
    }

    #[test]
    fn reset_returns_session_to_defaults() {
        let mut session = DockSession::new(3.0);
        session.session_id = Some(42);
        session.target_soc = 80.0;
        session.session_charged_kwh = 12.5;
        session.session_start = Some(Instant::now());
        session.completion = CompletionState::Done;

        session.reset();

        assert!(session.session_id.is_none());
        assert!(session.session_start.is_none());
        assert!((session.target_soc).abs() < f64::EPSILON);
        assert!((session.session_charged_kwh).abs() < f64::EPSILON);
        assert_eq!(session.completion, CompletionState::Idle);
    }

    #[test]
    fn session_specs_deserialize_from_channel_payload() {
        let payload = serde_json::json!({
            "sessionId": 7,
            "vehicle": { "batteryCapacityKwh": 75.0, "maxPowerKw": 11.0 },
            "charger": { "powerKw": 22.0 },
            "initialSoc": 40.0,
            "targetSoc": 80.0
        });
        let specs: SessionSpecs = serde_json::from_value(payload).unwrap();
        assert_eq!(specs.session_id, Some(7));
        assert!((specs.power_cap_kw() - 11.0).abs() < f64::EPSILON);
    }
}
