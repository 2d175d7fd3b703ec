//! Backend API client for Galvani
//!
//! HTTP operations against the charging authority: handshake, keep-alive
//! ping, telemetry log, session start and session completion with a legacy
//! endpoint fallback. The `DockBackend` trait is the seam the coordinator
//! talks through, so tests can substitute a recording implementation.

use crate::config::BackendConfig;
use crate::error::{GalvaniError, Result};
use crate::logging::get_logger;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Envelope returned by the handshake endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeEnvelope {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub ok: Option<bool>,

    #[serde(default)]
    pub channel_id: Option<String>,

    pub data: HandshakeData,
}

/// Charger record embedded in the handshake payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerInfo {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub code: Option<String>,

    pub power_kw: f64,

    #[serde(default)]
    pub price_per_kwh: Option<f64>,

    #[serde(default)]
    pub status: Option<String>,
}

/// Session credentials issued by the backend at handshake
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeData {
    pub session_id: i64,

    pub channel_id: String,

    /// Bearer token for the session endpoints
    pub dock_jwt: String,

    #[serde(default)]
    pub join_code: Option<String>,

    #[serde(default)]
    pub expires_at: Option<String>,

    #[serde(default)]
    pub charger: Option<ChargerInfo>,
}

/// Keep-alive ping response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub ok: bool,
    pub server_time: String,
}

/// Dock state reported in telemetry logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogState {
    Charging,
    Parking,
}

/// Telemetry log entry posted to the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockLogRequest {
    pub dock_id: i64,

    pub secret_key: String,

    /// Sample timestamp, RFC 3339
    pub sample_at: String,

    pub soc_percent: i64,

    pub state: LogState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_kw: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_energy_kwh: Option<f64>,
}

/// Completion payload for the current endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSessionRequest {
    pub energy_kwh: f64,
    pub duration_seconds: u64,
    pub end_soc: i64,
    pub price_per_kwh_override: Option<f64>,
}

/// Completion payload for the legacy stop endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSessionRequest {
    pub reason: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_soc: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_kwh: Option<f64>,
}

/// Backend operations the coordinator depends on
#[async_trait::async_trait]
pub trait DockBackend: Send + Sync {
    /// Negotiate a session for a newly connected vehicle
    async fn handshake(&self, dock_id: i64, secret_key: &str) -> Result<HandshakeData>;

    /// Keep-alive ping
    async fn ping(&self, dock_id: i64, secret_key: &str) -> Result<PingResponse>;

    /// Post one telemetry log entry
    async fn log(&self, request: &DockLogRequest) -> Result<()>;

    /// Announce that charging starts towards the given target SOC
    async fn start_session(&self, session_id: i64, target_soc: f64, dock_token: &str)
    -> Result<()>;

    /// Reconcile a finished session
    async fn complete_session(
        &self,
        session_id: i64,
        request: &CompleteSessionRequest,
        dock_token: &str,
    ) -> Result<()>;

    /// Legacy completion endpoint, used when the current one returns 404/405
    async fn stop_session_legacy(&self, session_id: i64, request: &StopSessionRequest)
    -> Result<()>;
}

/// `DockBackend` over HTTP
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    logger: crate::logging::StructuredLogger,
}

impl HttpBackend {
    /// Create a client for the configured backend
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GalvaniError::backend(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            logger: get_logger("backend"),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and fail on any non-2xx status
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GalvaniError::backend_status(
                status.as_u16(),
                format!("POST {} failed: {}", path, detail.trim()),
            ));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl DockBackend for HttpBackend {
    async fn handshake(&self, dock_id: i64, secret_key: &str) -> Result<HandshakeData> {
        self.logger.debug("Performing dock handshake with backend");
        let path = format!("/api/v1/docks/{}/handshake", dock_id);
        let body = serde_json::json!({ "secretKey": secret_key });
        let response = self.post_json(&path, &body, None).await?;
        let envelope: HandshakeEnvelope = response.json().await?;
        Ok(envelope.data)
    }

    async fn ping(&self, dock_id: i64, secret_key: &str) -> Result<PingResponse> {
        let body = serde_json::json!({ "dockId": dock_id, "secretKey": secret_key });
        let response = self.post_json("/api/v1/docks/ping", &body, None).await?;
        Ok(response.json().await?)
    }

    async fn log(&self, request: &DockLogRequest) -> Result<()> {
        self.post_json("/api/v1/docks/log", request, None).await?;
        Ok(())
    }

    async fn start_session(
        &self,
        session_id: i64,
        target_soc: f64,
        dock_token: &str,
    ) -> Result<()> {
        let body = serde_json::json!({ "sessionId": session_id, "targetSoc": target_soc });
        self.post_json("/api/v1/sessions/start", &body, Some(dock_token))
            .await?;
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: i64,
        request: &CompleteSessionRequest,
        dock_token: &str,
    ) -> Result<()> {
        let path = format!("/api/v1/sessions/{}/complete", session_id);
        self.post_json(&path, request, Some(dock_token)).await?;
        Ok(())
    }

    async fn stop_session_legacy(
        &self,
        session_id: i64,
        request: &StopSessionRequest,
    ) -> Result<()> {
        let path = format!("/api/v1/charging-sessions/{}/stop", session_id);
        self.post_json(&path, request, None).await?;
        Ok(())
    }
}
