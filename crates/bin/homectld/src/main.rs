//! # homectld: controller daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`homectl.toml`, environment overrides)
//! - Install the `tracing` subscriber
//! - Construct the adapters: registry, state-provider and dependent-controller
//!   clients, the virtual vendor, the in-process event bus
//! - Construct the device store, reconciler and device service
//! - Run the first reconciliation cycle, then keep polling if enabled
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use homectl_adapter_http_axum::state::AppState;
use homectl_adapter_remote_reqwest::{
    GatewayClient, GatewayConfig, HttpDependentController, HttpRegistry, HttpStateProvider,
};
use homectl_adapter_virtual::VirtualVendor;
use homectl_app::event_bus::InProcessEventBus;
use homectl_app::factory::DeviceFactory;
use homectl_app::propagator::DependencyPropagator;
use homectl_app::reconciler::Reconciler;
use homectl_app::services::DeviceService;
use homectl_app::store::DeviceStore;
use homectl_domain::event::Event;

use crate::config::Config;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Outbound adapters
    let gateway = GatewayClient::new(&GatewayConfig {
        base_url: config.registry.gateway_url.clone(),
        timeout: config.remote_timeout(),
    })?;
    let registry = Arc::new(HttpRegistry::new(gateway.clone()));
    let providers = HttpStateProvider::new(gateway.clone());
    let controller = HttpDependentController::new(gateway);
    let vendor = Arc::new(VirtualVendor::new());

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));
    tokio::spawn(log_events(event_bus.subscribe()));

    // Core
    let store = Arc::new(DeviceStore::new());
    let reconciler = Arc::new(Reconciler::new(
        config.controller.name.clone(),
        DeviceFactory::new(config.controller.kind),
        Arc::clone(&store),
        Arc::clone(&registry),
        Arc::clone(&vendor),
        providers,
        Arc::clone(&event_bus),
        config.vendor_timeout(),
        config.remote_timeout(),
    ));
    let propagator = DependencyPropagator::new(registry, controller, config.remote_timeout());
    let device_service = DeviceService::new(
        store,
        vendor,
        propagator,
        event_bus,
        config.vendor_timeout(),
    );

    let poller = if config.polling.enabled {
        tracing::info!(
            interval_ms = config.polling.interval_ms,
            "polling enabled"
        );
        Some(Arc::clone(&reconciler).spawn(config.polling_interval()))
    } else {
        let report = reconciler.run_cycle().await;
        tracing::info!(
            registry_reachable = report.populate.is_some(),
            pulled = report.pull.succeeded,
            "initial reconciliation done"
        );
        None
    };

    // HTTP
    let app = homectl_adapter_http_axum::router::build(AppState::new(device_service));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        controller = %config.controller.name,
        kind = %config.controller.kind,
        "homectld listening on http://{bind_addr}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(poller) = poller {
        poller.abort();
    }
    tracing::info!("homectld stopped");
    Ok(())
}

/// Trace every event crossing the bus.
async fn log_events(mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => tracing::debug!(topic = %event.topic, id = %event.id, "event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
