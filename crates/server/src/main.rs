use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tapdash_core::{
    load_config, load_config_from_env, validate_config, Gateway, LogFormat, RestGateway,
};
use tapdash_server::api::create_router;
use tapdash_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Config errors can happen before logging is up
        eprintln!("Fatal error: {:#}", e);
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("TAPDASH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; every section has defaults, so the file is optional
    let from_file = config_path.exists();
    let config = if from_file {
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        load_config_from_env().context("Failed to load config from environment")?
    };

    init_logging(config.logging.format);

    if from_file {
        info!("Loaded configuration from {:?}", config_path);
    } else {
        info!(
            "No config file at {:?}, using defaults and environment",
            config_path
        );
    }

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Gateway: {}", tapdash_core::SanitizedConfig::from(&config).gateway.url);

    let gateway: Arc<dyn Gateway> = Arc::new(
        RestGateway::new(config.gateway.clone()).context("Failed to create gateway client")?,
    );

    if gateway.health().await {
        info!("Gateway reachable");
    } else {
        // Not fatal: the poll keeps retrying and the dashboard reports it
        error!("Gateway not reachable at startup");
    }

    let state = Arc::new(AppState::new(config.clone(), gateway));
    let mint = Arc::clone(state.mint());

    mint.start();
    info!("Mint orchestrator started");

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    mint.stop();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
