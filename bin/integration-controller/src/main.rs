use anyhow::Result;
use integration_core::ConfigRegistry;
use kube::Client;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod integration_controller;

use config::OperatorConfig;
use integration_controller::IntegrationController;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting integration-controller...");

    let config = OperatorConfig::load()?;
    info!("  - Ingress: {} (host {})", config.ingress_name, config.ingress_host);
    info!("  - Registry: {} {}", config.registry_type, config.repository);

    // Registration happens once, before any reconciliation shares the registry
    let registry = Arc::new(ConfigRegistry::with_defaults());
    if !registry.contains(&config.registry_type) {
        warn!(
            "Registry type {} is not registered; reconciliations will fail until it is fixed",
            config.registry_type
        );
    }

    let client = Client::try_default().await?;
    let controller = IntegrationController::new(client, registry, config);

    tokio::spawn(async move {
        if let Err(e) = controller.run().await {
            error!("Integration controller error: {}", e);
        }
    });

    // Keep the process alive
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting...");

    Ok(())
}

/// `RUST_LOG` selects levels (default `info`); `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
