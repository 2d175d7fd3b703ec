//! Vehicle connection link and message types
//!
//! The gateway hands the coordinator a `VehicleLink` per accepted
//! connection; notices sent on it are serialized as `{event, data}` frames
//! on the wire. Sending is best-effort: a closed link drops the notice.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Battery configuration message from the vehicle
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarConfig {
    /// Current battery charge in kWh
    pub battery_capacity: f64,

    /// Battery capacity in kWh
    pub max_capacity: f64,

    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Notices sent to the connected vehicle
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum VehicleNotice {
    #[serde(rename_all = "camelCase")]
    HandshakeSuccess {
        session_id: i64,
        channel_id: String,
        join_code: String,
        message: String,
        timestamp: String,
    },

    ConnectionRejected {
        reason: String,
        timestamp: String,
    },

    ValidationError {
        event: String,
        error: String,
        timestamp: String,
    },

    ConfigurationComplete {
        message: String,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    PowerUpdate {
        kwh: f64,
        current_capacity: f64,
        max_capacity: f64,
        current_soc: f64,
        charging_power_kw: f64,
        timestamp: String,
    },

    #[serde(rename_all = "camelCase")]
    ChargingComplete {
        message: String,
        final_capacity: f64,
        max_capacity: f64,
        final_soc: f64,
        timestamp: String,
    },
}

impl VehicleNotice {
    /// Wire event name of this notice
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::HandshakeSuccess { .. } => "handshake_success",
            Self::ConnectionRejected { .. } => "connection_rejected",
            Self::ValidationError { .. } => "validation_error",
            Self::ConfigurationComplete { .. } => "configuration_complete",
            Self::PowerUpdate { .. } => "power_update",
            Self::ChargingComplete { .. } => "charging_complete",
        }
    }
}

/// Handle to one vehicle connection
#[derive(Debug, Clone)]
pub struct VehicleLink {
    conn_id: u64,
    sender: mpsc::UnboundedSender<VehicleNotice>,
}

impl VehicleLink {
    /// Wrap an existing notice sender
    pub fn new(conn_id: u64, sender: mpsc::UnboundedSender<VehicleNotice>) -> Self {
        Self { conn_id, sender }
    }

    /// Create a link together with its notice receiver
    pub fn pair(conn_id: u64) -> (Self, mpsc::UnboundedReceiver<VehicleNotice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(conn_id, sender), receiver)
    }

    /// Connection identity, used to discard stale events
    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    /// Whether the connection is still able to receive notices
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Send a notice; returns false when the connection is gone
    pub fn send(&self, notice: VehicleNotice) -> bool {
        self.sender.send(notice).is_ok()
    }
}
