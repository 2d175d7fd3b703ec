//! Shared fixtures for the coordinator integration tests
#![allow(dead_code)]

use galvani::backend::{
    ChargerInfo, CompleteSessionRequest, DockBackend, DockLogRequest, HandshakeData, LogState,
    PingResponse, StopSessionRequest,
};
use galvani::channel::{ChannelMessage, RealtimeHub};
use galvani::config::Config;
use galvani::coordinator::{CoordinatorEvent, DockCoordinator};
use galvani::error::{GalvaniError, Result};
use galvani::vehicle::{CarConfig, VehicleLink, VehicleNotice};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};

pub const SESSION_ID: i64 = 99;
pub const CHANNEL_ID: &str = "dock-3-chan";

/// Failure injection for the recording backend
#[derive(Debug, Default, Clone, Copy)]
pub struct BackendBehavior {
    pub fail_handshake: bool,
    pub fail_start: bool,
    /// Status returned as an error by the completion endpoint
    pub complete_status: Option<u16>,
    pub fail_log: bool,
    pub fail_legacy: bool,
}

/// `DockBackend` that records every call and fails on demand
pub struct RecordingBackend {
    behavior: BackendBehavior,
    calls: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Self::with(BackendBehavior::default())
    }

    pub fn with(behavior: BackendBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_of(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

#[async_trait::async_trait]
impl DockBackend for RecordingBackend {
    async fn handshake(&self, dock_id: i64, _secret_key: &str) -> Result<HandshakeData> {
        self.record(format!("handshake:{}", dock_id));
        if self.behavior.fail_handshake {
            return Err(GalvaniError::backend_status(500, "handshake refused"));
        }
        Ok(HandshakeData {
            session_id: SESSION_ID,
            channel_id: CHANNEL_ID.to_string(),
            dock_jwt: "jwt".to_string(),
            join_code: Some("ABCD".to_string()),
            expires_at: None,
            charger: Some(ChargerInfo {
                id: Some(1),
                code: None,
                power_kw: 50.0,
                price_per_kwh: Some(0.42),
                status: None,
            }),
        })
    }

    async fn ping(&self, dock_id: i64, _secret_key: &str) -> Result<PingResponse> {
        self.record(format!("ping:{}", dock_id));
        Ok(PingResponse {
            ok: true,
            server_time: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    async fn log(&self, request: &DockLogRequest) -> Result<()> {
        let state = match request.state {
            LogState::Charging => "CHARGING",
            LogState::Parking => "PARKING",
        };
        self.record(format!("log:{}:{}", state, request.soc_percent));
        if self.behavior.fail_log {
            return Err(GalvaniError::backend_status(503, "log unavailable"));
        }
        Ok(())
    }

    async fn start_session(
        &self,
        session_id: i64,
        target_soc: f64,
        _dock_token: &str,
    ) -> Result<()> {
        self.record(format!("start:{}:{}", session_id, target_soc));
        if self.behavior.fail_start {
            return Err(GalvaniError::backend_status(500, "start refused"));
        }
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: i64,
        request: &CompleteSessionRequest,
        _dock_token: &str,
    ) -> Result<()> {
        self.record(format!(
            "complete:{}:{}:{}",
            session_id, request.energy_kwh, request.end_soc
        ));
        if let Some(status) = self.behavior.complete_status {
            return Err(GalvaniError::backend_status(status, "complete failed"));
        }
        Ok(())
    }

    async fn stop_session_legacy(
        &self,
        session_id: i64,
        request: &StopSessionRequest,
    ) -> Result<()> {
        self.record(format!("stop_legacy:{}:{}", session_id, request.reason));
        if self.behavior.fail_legacy {
            return Err(GalvaniError::backend_status(500, "legacy failed"));
        }
        Ok(())
    }
}

/// Coordinator under test together with its collaborator handles
pub struct TestDock {
    pub coordinator: DockCoordinator,
    pub backend: Arc<RecordingBackend>,
    pub hub: RealtimeHub,
    pub hub_rx: broadcast::Receiver<ChannelMessage>,
    pub events_tx: mpsc::UnboundedSender<CoordinatorEvent>,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.dock.id = 3;
    config.dock.secret_key = "secret".to_string();
    config
}

pub fn dock() -> TestDock {
    dock_with(BackendBehavior::default())
}

pub fn dock_with(behavior: BackendBehavior) -> TestDock {
    let backend = RecordingBackend::with(behavior);
    let hub = RealtimeHub::new();
    let hub_rx = hub.subscribe();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let coordinator = DockCoordinator::new(
        test_config(),
        backend.clone(),
        hub.clone(),
        events_rx,
        events_tx.clone(),
    );
    TestDock {
        coordinator,
        backend,
        hub,
        hub_rx,
        events_tx,
    }
}

impl TestDock {
    /// Connect a vehicle and return its notice stream
    pub async fn connect(&mut self, conn_id: u64) -> mpsc::UnboundedReceiver<VehicleNotice> {
        let (link, notices) = VehicleLink::pair(conn_id);
        self.coordinator
            .handle_event(CoordinatorEvent::VehicleConnected(link))
            .await;
        notices
    }

    /// Deliver a `car_configure` message
    pub async fn configure(&mut self, conn_id: u64, current: f64, max: f64) {
        self.coordinator
            .handle_event(CoordinatorEvent::VehicleConfigure {
                conn_id,
                config: CarConfig {
                    battery_capacity: current,
                    max_capacity: max,
                    timestamp: None,
                },
            })
            .await;
    }

    /// Deliver a `start_session` channel event
    pub async fn start(&mut self, target_soc: Option<f64>) {
        self.coordinator
            .handle_event(CoordinatorEvent::Channel(
                galvani::channel::InboundEvent::StartSession(galvani::channel::StartRequest {
                    target_soc,
                }),
            ))
            .await;
    }

    /// Advance the simulation by one power tick
    pub async fn tick(&mut self) {
        self.coordinator
            .handle_event(CoordinatorEvent::PowerTick)
            .await;
    }

    pub async fn disconnect(&mut self, conn_id: u64) {
        self.coordinator
            .handle_event(CoordinatorEvent::VehicleDisconnected { conn_id })
            .await;
    }

    /// Hub messages observed so far
    pub fn drain_hub(&mut self) -> Vec<ChannelMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.hub_rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Drain whatever notices the vehicle has received so far
pub fn drain(notices: &mut mpsc::UnboundedReceiver<VehicleNotice>) -> Vec<VehicleNotice> {
    let mut drained = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        drained.push(notice);
    }
    drained
}
