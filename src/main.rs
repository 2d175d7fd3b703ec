use anyhow::Result;
use galvani::backend::{DockBackend, HttpBackend};
use galvani::channel::RealtimeHub;
use galvani::config::Config;
use galvani::coordinator::{CoordinatorEvent, DockCoordinator};
use galvani::gateway::VehicleGateway;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    galvani::logging::init_logging(&config.logging)?;

    info!(
        "Galvani charging dock simulator {} starting up (dock {})",
        env!("APP_VERSION"),
        config.dock.id
    );

    let backend: Arc<dyn DockBackend> = Arc::new(HttpBackend::new(&config.backend)?);
    let hub = RealtimeHub::new();
    let (events_tx, events_rx) = mpsc::unbounded_channel::<CoordinatorEvent>();

    // Vehicle gateway feeds the coordinator's event queue
    let gateway = VehicleGateway::bind(&config.gateway, events_tx.clone()).await?;
    let gateway_task = tokio::spawn(async move {
        if let Err(e) = gateway.run().await {
            error!("Vehicle gateway error: {}", e);
        }
    });

    // Ctrl-C requests a coordinator shutdown
    let shutdown_tx = events_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(CoordinatorEvent::Shutdown);
        }
    });

    let mut coordinator = DockCoordinator::new(config, backend, hub, events_rx, events_tx);
    let result = coordinator.run().await;
    gateway_task.abort();

    match result {
        Ok(()) => {
            info!("Coordinator shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Coordinator failed with error: {}", e);
            Err(anyhow::anyhow!("Coordinator error: {}", e))
        }
    }
}
