//! Vehicle connection gateway for Galvani
//!
//! TCP listener speaking one JSON object per line, `{event, data}` in both
//! directions. Each accepted connection gets a `VehicleLink` whose notices
//! are written back on the socket; inbound frames are decoded and forwarded
//! to the coordinator's event queue. The gateway itself holds no session
//! state; exclusivity is the coordinator's decision.

use crate::coordinator::CoordinatorEvent;
use crate::error::{GalvaniError, Result};
use crate::logging::get_logger;
use crate::vehicle::{CarConfig, VehicleLink};
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// One wire frame from the vehicle
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleFrame {
    pub event: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

/// Decode one line into a wire frame
pub fn decode_frame(line: &str) -> Result<VehicleFrame> {
    Ok(serde_json::from_str(line)?)
}

/// TCP listener feeding the coordinator event queue
pub struct VehicleGateway {
    listener: TcpListener,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    logger: crate::logging::StructuredLogger,
}

impl VehicleGateway {
    /// Bind the configured listen address
    pub async fn bind(
        config: &crate::config::GatewayConfig,
        events: mpsc::UnboundedSender<CoordinatorEvent>,
    ) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|e| {
                GalvaniError::gateway(format!(
                    "Failed to bind {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        let logger = get_logger("gateway");
        logger.info(&format!(
            "Vehicle gateway listening on {}:{}",
            config.host, config.port
        ));

        Ok(Self {
            listener,
            events,
            logger,
        })
    }

    /// The bound address, useful when the port was 0
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails
    pub async fn run(self) -> Result<()> {
        let mut next_conn_id: u64 = 0;
        loop {
            let (stream, peer) = self
                .listener
                .accept()
                .await
                .map_err(|e| GalvaniError::gateway(format!("Accept failed: {}", e)))?;
            next_conn_id += 1;
            self.logger.info(&format!(
                "Connection accepted from {} (conn {})",
                peer, next_conn_id
            ));
            tokio::spawn(handle_connection(stream, next_conn_id, self.events.clone()));
        }
    }
}

/// Drive one connection: writer task for notices, read loop for frames
async fn handle_connection(
    stream: TcpStream,
    conn_id: u64,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
) {
    let logger = get_logger("gateway");
    let (read_half, mut write_half) = stream.into_split();
    let (link, mut notices) = VehicleLink::pair(conn_id);

    let writer = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            let Ok(mut line) = serde_json::to_string(&notice) else {
                continue;
            };
            line.push('\n');
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
        // Link dropped or socket gone; flush the FIN either way
        let _ = write_half.shutdown().await;
    });

    if events
        .send(CoordinatorEvent::VehicleConnected(link))
        .is_err()
    {
        writer.abort();
        return;
    }

    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match decode_frame(line) {
                    Ok(frame) => dispatch_frame(conn_id, frame, &events, &logger),
                    Err(e) => {
                        logger.warn(&format!("Malformed frame from conn {}: {}", conn_id, e));
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                logger.debug(&format!("Read error on conn {}: {}", conn_id, e));
                break;
            }
        }
    }

    let _ = events.send(CoordinatorEvent::VehicleDisconnected { conn_id });
}

fn dispatch_frame(
    conn_id: u64,
    frame: VehicleFrame,
    events: &mpsc::UnboundedSender<CoordinatorEvent>,
    logger: &crate::logging::StructuredLogger,
) {
    match frame.event.as_str() {
        "car_configure" => match serde_json::from_value::<CarConfig>(frame.data) {
            Ok(config) => {
                let _ = events.send(CoordinatorEvent::VehicleConfigure { conn_id, config });
            }
            Err(e) => {
                logger.warn(&format!(
                    "Malformed car_configure payload from conn {}: {}",
                    conn_id, e
                ));
            }
        },
        other => {
            logger.debug(&format!(
                "Ignoring unknown vehicle event '{}' from conn {}",
                other, conn_id
            ));
        }
    }
}
