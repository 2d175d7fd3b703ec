//! Realtime pub/sub channel for Galvani
//!
//! An in-process hub standing in for the hosted pub/sub service: the
//! coordinator publishes telemetry, heartbeats and completion events on its
//! session channel and subscribes to the inbound control events. Inbound
//! payloads are parsed into a typed union; unknown event names are ignored.

use crate::error::{GalvaniError, Result};
use crate::session::SessionSpecs;
use serde::Deserialize;
use tokio::sync::broadcast;

/// Inbound event names the coordinator reacts to
pub const SESSION_SPECS: &str = "session_specs";
pub const START_SESSION: &str = "start_session";
pub const START_CHARGING: &str = "start_charging";
pub const LOAD_CAR_INFORMATION: &str = "load_car_information";

/// Outbound event names published by the coordinator
pub const DOCK_HEARTBEAT: &str = "dock_heartbeat";
pub const CAR_INFORMATION: &str = "car_information";
pub const SOC_UPDATE: &str = "soc_update";
pub const CHARGING_COMPLETE: &str = "charging_complete";

/// One message on the hub
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    /// Channel the message was published on
    pub channel: String,

    /// Event name
    pub name: String,

    /// Raw payload
    pub data: serde_json::Value,
}

/// Start request payload; target SOC is optional and arrives under several
/// historical field spellings
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct StartRequest {
    #[serde(
        default,
        rename = "targetSOC",
        alias = "targetSoc",
        alias = "TargetSOC",
        alias = "target_soc"
    )]
    pub target_soc: Option<f64>,
}

/// Typed union over the known inbound channel events
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// Vehicle/charger specs for the running session
    SessionSpecs(SessionSpecs),

    /// Request to start charging, optionally with a target SOC
    StartSession(StartRequest),

    /// Request to publish the vehicle's battery information
    LoadCarInformation,
}

impl InboundEvent {
    /// Parse a named payload into a typed event.
    ///
    /// `Ok(None)` means the name is not an inbound event; a malformed
    /// payload for a known name is an error.
    pub fn parse(name: &str, data: &serde_json::Value) -> Result<Option<Self>> {
        match name {
            SESSION_SPECS => {
                let specs: SessionSpecs = serde_json::from_value(data.clone())?;
                Ok(Some(Self::SessionSpecs(specs)))
            }
            START_SESSION | START_CHARGING => {
                let request: StartRequest = if data.is_null() {
                    StartRequest::default()
                } else {
                    serde_json::from_value(data.clone())?
                };
                Ok(Some(Self::StartSession(request)))
            }
            LOAD_CAR_INFORMATION => Ok(Some(Self::LoadCarInformation)),
            _ => Ok(None),
        }
    }

    /// Whether the name is one of the coordinator's own publications
    pub fn is_publication(name: &str) -> bool {
        matches!(
            name,
            DOCK_HEARTBEAT | CAR_INFORMATION | SOC_UPDATE | CHARGING_COMPLETE
        )
    }
}

/// Process-wide pub/sub hub
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    sender: broadcast::Sender<ChannelMessage>,
}

impl RealtimeHub {
    /// Create a hub with a bounded replay buffer
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Subscribe to every message on the hub
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.sender.subscribe()
    }

    /// Publish a named payload on a channel.
    ///
    /// Publishing with no live subscribers is not an error; the message is
    /// simply not observed by anyone.
    pub fn publish(&self, channel: &str, name: &str, data: serde_json::Value) -> Result<()> {
        let message = ChannelMessage {
            channel: channel.to_string(),
            name: name.to_string(),
            data,
        };
        let _ = self.sender.send(message);
        Ok(())
    }

    /// Handle for publishing on one session channel
    pub fn attach(&self, channel_id: &str) -> ChannelHandle {
        ChannelHandle {
            channel_id: channel_id.to_string(),
            hub: self.clone(),
        }
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishing handle bound to one session channel
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    channel_id: String,
    hub: RealtimeHub,
}

impl ChannelHandle {
    /// The bound channel ID
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Publish a named payload on the bound channel
    pub fn publish(&self, name: &str, data: serde_json::Value) -> Result<()> {
        self.hub
            .publish(&self.channel_id, name, data)
            .map_err(|e| GalvaniError::channel(e.to_string()))
    }
}
