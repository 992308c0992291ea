use anyhow::Context;
use clap::Parser;
use discovery_server::utils::{logger, validation::Validate};
use discovery_server::{CliConfig, RegistryService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration ({}): {}", e.kind(), e);
            std::process::exit(1);
        }
    };

    if config.json_logs {
        logger::init_json_logger(config.verbose, config.log_level.as_deref());
    } else {
        logger::init_cli_logger(config.verbose, config.log_level.as_deref());
    }

    tracing::info!("Starting discovery-server");
    tracing::debug!("Server config: {:?}", config);

    let bind = config.bind_addr()?;
    let service = Arc::new(RegistryService::with_os_ports(
        config.port_source()?,
        config.registry_settings(),
    ));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    discovery_server::serve(listener, service, shutdown_signal()).await?;

    tracing::info!("Server stopped, registry discarded");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
