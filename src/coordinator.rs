//! Session coordinator for Galvani
//!
//! The coordinator owns the dock's state machine and is the only component
//! that mutates session state. Every external stimulus (vehicle connect,
//! configuration, disconnect, channel events, timer ticks) arrives as a
//! `CoordinatorEvent` on one queue and is processed strictly sequentially,
//! so a tick can never observe a half-torn-down session and two completion
//! triggers can never run the reconciliation concurrently.
//!
//! Phases: `Idle → Handshaking → Ready → Charging → Completing → Idle`,
//! with rejection exits from `Idle` (slot occupied) and `Handshaking`
//! (backend failure) straight back to `Idle`.

use crate::backend::{CompleteSessionRequest, DockBackend, StopSessionRequest};
use crate::channel::{self, ChannelHandle, InboundEvent, RealtimeHub};
use crate::config::Config;
use crate::engine::{self, round2};
use crate::error::{GalvaniError, Result};
use crate::logging::get_logger;
use crate::scheduler::PeriodicTask;
use crate::session::{ChargerSpec, CompletionState, DockPhase, DockSession, VehicleSpec};
use crate::telemetry::{self, TelemetrySample};
use crate::vehicle::{CarConfig, VehicleLink, VehicleNotice};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// External stimuli processed by the coordinator, in arrival order
#[derive(Debug)]
pub enum CoordinatorEvent {
    /// A vehicle connection was accepted by the gateway
    VehicleConnected(VehicleLink),

    /// Battery configuration from the connected vehicle
    VehicleConfigure { conn_id: u64, config: CarConfig },

    /// The vehicle connection closed
    VehicleDisconnected { conn_id: u64 },

    /// Typed inbound event from the realtime channel
    Channel(InboundEvent),

    /// Advance the charging simulation by one tick
    PowerTick,

    /// Sample and report telemetry
    TelemetryTick,

    /// Publish a realtime heartbeat
    Heartbeat,

    /// Backend keep-alive ping
    Ping,

    /// Stop the coordinator loop
    Shutdown,
}

/// The dock's session coordinator
pub struct DockCoordinator {
    config: Config,
    backend: Arc<dyn DockBackend>,
    hub: RealtimeHub,
    events_rx: mpsc::UnboundedReceiver<CoordinatorEvent>,
    events_tx: mpsc::UnboundedSender<CoordinatorEvent>,

    phase: DockPhase,
    session: DockSession,

    /// The connection slot: at most one vehicle at a time
    vehicle: Option<VehicleLink>,

    channel: Option<ChannelHandle>,
    channel_feed: Option<JoinHandle<()>>,

    power_task: Option<PeriodicTask>,
    telemetry_task: Option<PeriodicTask>,
    heartbeat_task: Option<PeriodicTask>,
    ping_task: Option<PeriodicTask>,

    logger: crate::logging::StructuredLogger,
}

impl DockCoordinator {
    /// Create a coordinator processing events from `events_rx`
    pub fn new(
        config: Config,
        backend: Arc<dyn DockBackend>,
        hub: RealtimeHub,
        events_rx: mpsc::UnboundedReceiver<CoordinatorEvent>,
        events_tx: mpsc::UnboundedSender<CoordinatorEvent>,
    ) -> Self {
        let session = DockSession::new(config.charging.power_hold_seconds);
        Self {
            config,
            backend,
            hub,
            events_rx,
            events_tx,
            phase: DockPhase::Idle,
            session,
            vehicle: None,
            channel: None,
            channel_feed: None,
            power_task: None,
            telemetry_task: None,
            heartbeat_task: None,
            ping_task: None,
            logger: get_logger("coordinator"),
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> DockPhase {
        self.phase
    }

    /// Whether the connection slot is occupied
    pub fn slot_occupied(&self) -> bool {
        self.vehicle.is_some()
    }

    /// Read access to the session, for sampling and assertions
    pub fn session(&self) -> &DockSession {
        &self.session
    }

    /// Run the event loop until a `Shutdown` event arrives
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info("Starting dock coordinator");
        self.start_ping();

        loop {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            if matches!(event, CoordinatorEvent::Shutdown) {
                self.logger.info("Shutdown signal received");
                break;
            }
            self.handle_event(event).await;
        }

        self.release_connection();
        if let Some(task) = self.ping_task.take() {
            task.cancel();
        }
        self.logger.info("Dock coordinator stopped");
        Ok(())
    }

    /// Process one event to completion.
    ///
    /// All session mutation happens here; suspension points are only the
    /// awaited collaborator calls.
    pub async fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::VehicleConnected(link) => self.accept_connection(link).await,
            CoordinatorEvent::VehicleConfigure { conn_id, config } => {
                self.configure_vehicle(conn_id, &config);
            }
            CoordinatorEvent::VehicleDisconnected { conn_id } => {
                self.on_disconnect(conn_id).await;
            }
            CoordinatorEvent::Channel(inbound) => self.on_channel_event(inbound).await,
            CoordinatorEvent::PowerTick => self.on_power_tick().await,
            CoordinatorEvent::TelemetryTick => self.on_telemetry_tick().await,
            CoordinatorEvent::Heartbeat => self.on_heartbeat(),
            CoordinatorEvent::Ping => self.on_ping().await,
            CoordinatorEvent::Shutdown => {}
        }
    }

    /// Accept or reject an inbound connection, then handshake
    async fn accept_connection(&mut self, link: VehicleLink) {
        if self.vehicle.is_some() {
            self.logger
                .warn("Connection rejected: another vehicle is already connected");
            link.send(VehicleNotice::ConnectionRejected {
                reason: GalvaniError::SlotOccupied.to_string(),
                timestamp: Utc::now().to_rfc3339(),
            });
            // Dropping the link closes the connection after the notice drains
            return;
        }

        self.logger
            .info(&format!("Vehicle connected (conn {})", link.conn_id()));
        self.vehicle = Some(link);
        self.phase = DockPhase::Handshaking;
        self.perform_handshake().await;
    }

    /// Handshake with the backend; session identity is negotiated per visit
    async fn perform_handshake(&mut self) {
        self.logger.info("Initiating handshake with backend");

        let dock_id = self.config.dock.id;
        let secret = self.config.dock.secret_key.clone();
        match self.backend.handshake(dock_id, &secret).await {
            Ok(data) => {
                self.session.session_id = Some(data.session_id);
                self.session.channel_id = Some(data.channel_id.clone());
                self.session.dock_token = Some(data.dock_jwt);
                self.session.join_code = data.join_code;
                self.session.charger = data.charger.map(|c| ChargerSpec {
                    power_kw: c.power_kw,
                    price_per_kwh: c.price_per_kwh,
                });

                self.attach_channel(&data.channel_id);
                self.phase = DockPhase::Ready;

                self.logger = crate::logging::get_logger_with_context(
                    crate::logging::LogContext::new("coordinator")
                        .with_session_id(data.session_id),
                );
                self.logger.info(&format!(
                    "Handshake successful, session {} on channel {}",
                    data.session_id, data.channel_id
                ));

                self.notify_vehicle(VehicleNotice::HandshakeSuccess {
                    session_id: data.session_id,
                    channel_id: data.channel_id,
                    join_code: self
                        .session
                        .join_code
                        .clone()
                        .unwrap_or_else(|| "N/A".to_string()),
                    message: "Successfully connected to dock. Please configure your vehicle."
                        .to_string(),
                    timestamp: Utc::now().to_rfc3339(),
                });
            }
            Err(e) => {
                self.logger.error(&format!("Dock handshake failed: {}", e));
                self.notify_vehicle(VehicleNotice::ConnectionRejected {
                    reason: "Failed to initialize dock session with backend".to_string(),
                    timestamp: Utc::now().to_rfc3339(),
                });
                self.release_connection();
            }
        }
    }

    /// Attach the realtime channel: subscribe to inbound events and start
    /// the heartbeat
    fn attach_channel(&mut self, channel_id: &str) {
        self.channel = Some(self.hub.attach(channel_id));

        let mut subscription = self.hub.subscribe();
        let events = self.events_tx.clone();
        let channel_name = channel_id.to_string();
        let logger = get_logger("channel");
        self.channel_feed = Some(tokio::spawn(async move {
            loop {
                let message = match subscription.recv().await {
                    Ok(message) => message,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        logger.warn(&format!("Channel subscription lagged, {} events lost", n));
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                if message.channel != channel_name {
                    continue;
                }
                match InboundEvent::parse(&message.name, &message.data) {
                    Ok(Some(inbound)) => {
                        if events.send(CoordinatorEvent::Channel(inbound)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        if !InboundEvent::is_publication(&message.name) {
                            logger.debug(&format!(
                                "Ignoring unknown channel event '{}'",
                                message.name
                            ));
                        }
                    }
                    Err(e) => {
                        logger.warn(&format!(
                            "Malformed '{}' channel payload: {}",
                            message.name, e
                        ));
                    }
                }
            }
        }));

        let events = self.events_tx.clone();
        self.heartbeat_task = Some(PeriodicTask::spawn(
            "heartbeat",
            Duration::from_secs(self.config.charging.heartbeat_interval_seconds),
            move || {
                let _ = events.send(CoordinatorEvent::Heartbeat);
            },
        ));
    }

    /// Validate and store the vehicle's battery configuration
    fn configure_vehicle(&mut self, conn_id: u64, config: &CarConfig) {
        if !self.is_current_connection(conn_id) {
            self.logger
                .debug(&format!("Ignoring configuration from stale conn {}", conn_id));
            return;
        }

        self.logger.info(&format!(
            "Received configuration: current {} kWh, max {} kWh",
            config.battery_capacity, config.max_capacity
        ));

        if self.phase != DockPhase::Ready {
            self.logger
                .warn("Configuration rejected: dock is not ready for configuration");
            self.notify_vehicle(VehicleNotice::ValidationError {
                event: "car_configure".to_string(),
                error: "configuration is not accepted in the current state".to_string(),
                timestamp: Utc::now().to_rfc3339(),
            });
            return;
        }

        let spec = VehicleSpec {
            current_capacity_kwh: config.battery_capacity,
            max_capacity_kwh: config.max_capacity,
        };
        if let Some(rule) = spec.violation() {
            self.logger
                .error(&format!("Invalid vehicle configuration: {}", rule));
            self.notify_vehicle(VehicleNotice::ValidationError {
                event: "car_configure".to_string(),
                error: rule.to_string(),
                timestamp: Utc::now().to_rfc3339(),
            });
            return;
        }

        self.session.vehicle = Some(spec);
        self.notify_vehicle(VehicleNotice::ConfigurationComplete {
            message: "Vehicle configured. Waiting for charging to start.".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    /// Dispatch a typed inbound channel event
    async fn on_channel_event(&mut self, inbound: InboundEvent) {
        match inbound {
            InboundEvent::SessionSpecs(specs) => {
                self.logger.info("Session specs received");
                self.session.specs = Some(specs);
                // A new spec invalidates the estimation trace
                self.session.estimator.reset();
            }
            InboundEvent::StartSession(request) => {
                self.start_charging(request.target_soc).await;
            }
            InboundEvent::LoadCarInformation => {
                let (current, max) = self
                    .session
                    .vehicle
                    .map(|v| (v.current_capacity_kwh, v.max_capacity_kwh))
                    .unwrap_or((0.0, 0.0));
                self.publish(
                    channel::CAR_INFORMATION,
                    serde_json::json!({
                        "currentCapacity": current,
                        "maxCapacity": max,
                        "timestamp": Utc::now().to_rfc3339(),
                    }),
                );
            }
        }
    }

    /// Start charging towards the requested target SOC.
    ///
    /// No session state changes until the backend acknowledges the start.
    async fn start_charging(&mut self, requested_target: Option<f64>) {
        if self.phase == DockPhase::Charging {
            self.logger
                .info("Charging already in progress, ignoring start request");
            return;
        }
        if self.vehicle.is_none() {
            self.logger.info("No vehicle connected, cannot start charging");
            return;
        }
        if self.phase != DockPhase::Ready {
            self.logger
                .warn("Start request rejected: dock is not ready");
            return;
        }
        let Some(spec) = self.session.vehicle else {
            self.logger
                .warn("Start request rejected: vehicle is not configured");
            return;
        };

        let current_soc = spec.soc();
        let target = match requested_target {
            Some(target) => {
                if !(0.0..=100.0).contains(&target) {
                    self.logger.error(&format!(
                        "Rejected target SOC {}: must be between 0 and 100",
                        target
                    ));
                    return;
                }
                if target <= current_soc {
                    self.logger.error(&format!(
                        "Rejected target SOC {}%: not greater than current SOC {:.1}%",
                        target, current_soc
                    ));
                    return;
                }
                target
            }
            None => {
                let default = self.config.charging.default_target_soc;
                self.logger.info(&format!(
                    "Target SOC not specified, defaulting to {}%",
                    default
                ));
                default
            }
        };

        let (Some(session_id), Some(token)) =
            (self.session.session_id, self.session.dock_token.clone())
        else {
            self.logger
                .error("Start request rejected: no backend session negotiated");
            return;
        };

        match self.backend.start_session(session_id, target, &token).await {
            Ok(()) => {
                self.session.target_soc = target;
                self.session.session_charged_kwh = 0.0;
                self.session.session_start = Some(Instant::now());
                self.phase = DockPhase::Charging;
                self.start_charging_tasks();
                self.logger.info(&format!(
                    "Charging session {} started, target {}%",
                    session_id, target
                ));
            }
            Err(e) => {
                self.logger
                    .error(&format!("Failed to start session with backend: {}", e));
            }
        }
    }

    /// Advance the simulation by one tick; may trigger completion
    async fn on_power_tick(&mut self) {
        // A tick queued before teardown lands here and is discarded
        if self.phase != DockPhase::Charging {
            return;
        }
        let Some(spec) = self.session.vehicle else {
            return;
        };

        let Some(charger) = self.session.charger.filter(|c| c.power_kw > 0.0) else {
            self.logger
                .error("Invalid charger power configuration, stopping charging");
            self.stop_charging_tasks();
            self.phase = DockPhase::Ready;
            return;
        };

        let vehicle_max = self.session.specs.map(|s| s.vehicle.max_power_kw);
        let outcome = engine::simulate_tick(
            charger.power_kw,
            vehicle_max,
            spec.current_capacity_kwh,
            spec.max_capacity_kwh,
            self.session.target_soc,
            self.config.tick_seconds(),
        );

        // Mutate first, notify second: observers must never see a power
        // update inconsistent with the stored state
        if let Some(vehicle) = self.session.vehicle.as_mut() {
            vehicle.current_capacity_kwh = outcome.new_capacity_kwh;
        }
        self.session.session_charged_kwh += outcome.delivered_kwh;

        self.notify_vehicle(VehicleNotice::PowerUpdate {
            kwh: round2(outcome.delivered_kwh),
            current_capacity: round2(outcome.new_capacity_kwh),
            max_capacity: round2(spec.max_capacity_kwh),
            current_soc: round2(outcome.new_soc),
            charging_power_kw: round2(outcome.power_kw),
            timestamp: Utc::now().to_rfc3339(),
        });

        self.logger.debug(&format!(
            "Power update - SOC: {:.1}% | Capacity: {:.3} kWh | Power: {:.2} kW | Added: {:.2} Wh",
            outcome.new_soc,
            outcome.new_capacity_kwh,
            outcome.power_kw,
            outcome.delivered_kwh * 1000.0
        ));

        if outcome.target_reached {
            let target = self.session.target_soc;
            self.logger.info(&format!(
                "Target SOC {}% reached, stopping charging",
                target
            ));
            self.stop_charging_tasks();
            self.complete_session(format!(
                "Charging complete! Reached target SOC of {}%",
                target
            ))
            .await;
            // The dock disconnects the vehicle once completion is delivered
            self.release_connection();
        }
    }

    /// Sample current state and report it to backend and channel
    async fn on_telemetry_tick(&mut self) {
        if self.phase != DockPhase::Charging {
            return;
        }
        let Some(spec) = self.session.vehicle else {
            return;
        };

        let energy = self.session.session_charged_kwh;
        let power_kw = match self.session.specs.map(|s| s.power_cap_kw()) {
            Some(cap) => self
                .session
                .estimator
                .observe(energy, Instant::now(), cap),
            None => None,
        };
        let sample = TelemetrySample {
            soc: spec.soc(),
            session_energy_kwh: Some(energy),
            power_kw,
            sampled_at: Utc::now(),
        };

        let request = telemetry::charging_log(&self.config.dock, &sample);
        if let Err(e) = self.backend.log(&request).await {
            self.logger
                .error(&format!("Failed to send log to backend: {}", e));
        }

        self.publish(channel::SOC_UPDATE, telemetry::soc_update(&sample));
    }

    /// Publish the periodic realtime heartbeat
    fn on_heartbeat(&mut self) {
        if self.channel.is_none() {
            return;
        }
        self.publish(
            channel::DOCK_HEARTBEAT,
            serde_json::json!({ "timestamp": Utc::now().to_rfc3339() }),
        );
    }

    /// Backend keep-alive ping, best-effort
    async fn on_ping(&mut self) {
        let dock_id = self.config.dock.id;
        let secret = self.config.dock.secret_key.clone();
        match self.backend.ping(dock_id, &secret).await {
            Ok(response) => {
                self.logger
                    .debug(&format!("Ping successful, server time {}", response.server_time));
            }
            Err(e) => {
                self.logger.error(&format!("Ping request failed: {}", e));
            }
        }
    }

    /// Handle the vehicle connection closing; interrupts charging if active
    async fn on_disconnect(&mut self, conn_id: u64) {
        if !self.is_current_connection(conn_id) {
            self.logger
                .debug(&format!("Ignoring disconnect from stale conn {}", conn_id));
            return;
        }

        self.logger
            .info(&format!("Vehicle disconnected (conn {})", conn_id));

        if self.phase == DockPhase::Charging && self.session.completion == CompletionState::Idle {
            let soc = self.session.soc();
            self.logger
                .info("Vehicle disconnected during charging, completing session");
            // Stop ticks before any reconciliation I/O
            self.stop_charging_tasks();
            self.complete_session(format!(
                "Charging interrupted! Vehicle disconnected at {:.1}% SOC",
                soc
            ))
            .await;
        }

        self.release_connection();
    }

    /// Completion reconciliation, exactly once per session.
    ///
    /// Local state is reset by the caller's teardown regardless of how many
    /// of the remote steps succeed.
    async fn complete_session(&mut self, reason: String) {
        if self.session.completion != CompletionState::Idle {
            self.logger
                .warn("Completion already performed for this session, skipping");
            return;
        }
        self.session.completion = CompletionState::InFlight;
        self.phase = DockPhase::Completing;
        self.logger.info("Starting charging completion");

        let (capacity, max_capacity) = self
            .session
            .vehicle
            .map(|v| (v.current_capacity_kwh, v.max_capacity_kwh))
            .unwrap_or((0.0, 0.0));
        let final_soc = if max_capacity > 0.0 {
            (capacity / max_capacity) * 100.0
        } else {
            0.0
        };
        let energy = self.session.session_charged_kwh;
        let duration_seconds = self.session.duration_seconds();
        let now = Utc::now();

        // Final telemetry log, best-effort
        let sample = TelemetrySample {
            soc: final_soc,
            session_energy_kwh: Some(energy),
            power_kw: None,
            sampled_at: now,
        };
        let parking = telemetry::parking_log(&self.config.dock, &sample);
        if let Err(e) = self.backend.log(&parking).await {
            self.logger
                .error(&format!("Failed to send final log to backend: {}", e));
        }

        if self.vehicle.as_ref().is_some_and(VehicleLink::is_alive) {
            self.notify_vehicle(VehicleNotice::ChargingComplete {
                message: reason.clone(),
                final_capacity: round2(capacity),
                max_capacity: round2(max_capacity),
                final_soc: round2(final_soc),
                timestamp: now.to_rfc3339(),
            });
        }

        if self.channel.is_some() {
            self.publish(
                channel::CHARGING_COMPLETE,
                serde_json::json!({
                    "status": "completed",
                    "finalSOC": round2(final_soc),
                    "finalCapacity": round2(capacity),
                    "targetSOC": self.session.target_soc,
                    "sessionChargedKwh": round2(energy),
                    "timestamp": now.to_rfc3339(),
                    "sessionId": self.session.session_id,
                }),
            );
        } else {
            self.logger
                .debug("Realtime channel already detached, skipping completion publish");
        }

        if let (Some(session_id), Some(token)) =
            (self.session.session_id, self.session.dock_token.clone())
        {
            self.logger.info(&format!(
                "Session duration: {} seconds ({:.2} minutes)",
                duration_seconds,
                duration_seconds as f64 / 60.0
            ));
            let request = CompleteSessionRequest {
                energy_kwh: round2(energy),
                duration_seconds,
                end_soc: telemetry::soc_percent(final_soc),
                price_per_kwh_override: self.session.charger.and_then(|c| c.price_per_kwh),
            };
            match self
                .backend
                .complete_session(session_id, &request, &token)
                .await
            {
                Ok(()) => {
                    self.logger.info("Session completed with backend");
                }
                Err(e) if matches!(e.http_status(), Some(404 | 405)) => {
                    self.logger.warn(&format!(
                        "Completion endpoint unavailable ({}), retrying legacy stop endpoint",
                        e
                    ));
                    let stop = StopSessionRequest {
                        reason,
                        final_soc: Some(round2(final_soc)),
                        energy_kwh: Some(round2(energy)),
                    };
                    if let Err(legacy) = self.backend.stop_session_legacy(session_id, &stop).await
                    {
                        self.logger.error(&format!(
                            "Legacy completion also failed: {}",
                            legacy
                        ));
                    }
                }
                Err(e) => {
                    self.logger
                        .error(&format!("Failed to complete session with backend: {}", e));
                }
            }
        }

        self.session.completion = CompletionState::Done;
        self.logger.info("Charging completion finished");
    }

    /// Tear down the connection and reset for the next vehicle. Idempotent.
    fn release_connection(&mut self) {
        // Cancel owned timers before anything else so no tick can land on
        // a reset session
        self.stop_charging_tasks();
        if let Some(task) = self.heartbeat_task.take() {
            task.cancel();
        }
        if let Some(feed) = self.channel_feed.take() {
            feed.abort();
        }
        self.channel = None;
        // Dropping the link closes the connection once pending notices drain
        self.vehicle = None;
        self.session.reset();
        self.phase = DockPhase::Idle;
        self.logger = get_logger("coordinator");
        self.logger
            .info("Connection cleanup complete, dock ready for next vehicle");
    }

    /// Start the power and telemetry tick tasks
    fn start_charging_tasks(&mut self) {
        let events = self.events_tx.clone();
        self.power_task = Some(PeriodicTask::spawn(
            "power_tick",
            Duration::from_millis(self.config.charging.tick_interval_ms),
            move || {
                let _ = events.send(CoordinatorEvent::PowerTick);
            },
        ));

        let events = self.events_tx.clone();
        self.telemetry_task = Some(PeriodicTask::spawn(
            "telemetry_tick",
            Duration::from_millis(self.config.charging.telemetry_interval_ms),
            move || {
                let _ = events.send(CoordinatorEvent::TelemetryTick);
            },
        ));
    }

    /// Cancel the power and telemetry tick tasks
    fn stop_charging_tasks(&mut self) {
        if let Some(task) = self.power_task.take() {
            task.cancel();
        }
        if let Some(task) = self.telemetry_task.take() {
            task.cancel();
        }
    }

    /// Start the backend keep-alive ping task
    fn start_ping(&mut self) {
        let events = self.events_tx.clone();
        self.ping_task = Some(PeriodicTask::spawn(
            "ping",
            Duration::from_secs(self.config.charging.ping_interval_seconds),
            move || {
                let _ = events.send(CoordinatorEvent::Ping);
            },
        ));
    }

    fn is_current_connection(&self, conn_id: u64) -> bool {
        self.vehicle.as_ref().map(VehicleLink::conn_id) == Some(conn_id)
    }

    /// Send a notice to the connected vehicle, best-effort
    fn notify_vehicle(&self, notice: VehicleNotice) {
        if let Some(link) = &self.vehicle {
            let name = notice.event_name();
            if !link.send(notice) {
                self.logger
                    .debug(&format!("Vehicle connection gone, dropped '{}'", name));
            }
        }
    }

    /// Publish on the session channel, best-effort
    fn publish(&self, name: &str, data: serde_json::Value) {
        if let Some(channel) = &self.channel {
            if let Err(e) = channel.publish(name, data) {
                self.logger
                    .error(&format!("Failed to publish '{}' to channel: {}", name, e));
            }
        }
    }
}
