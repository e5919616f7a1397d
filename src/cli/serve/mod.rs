//! Serve command - runs the discovery API

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::{create_metrics_router, init_metrics};

/// Overrides applied on top of the loaded configuration
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind, e.g. 127.0.0.1
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    pub port: Option<u16>,
}

/// Run the API server until SIGINT or SIGTERM
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().unwrap_or_default();
    apply_overrides(&mut config, args);

    logging::init_logging(&config.logging);

    let metrics = init_metrics(&config.metrics);
    let context = crate::create_app_state(&config).await?;

    let mut app = create_router(context.state, config.server.max_upload_bytes);

    if let Some(m) = metrics {
        app = app.merge(create_metrics_router(m, &config.metrics.path));
    }

    let addr = build_socket_addr(&config)?;
    info!("Starting discovery API on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    // Draining may hang on a stuck upstream call; bound it once the signal fires.
    tokio::select! {
        result = server => result?,
        _ = drain_deadline(grace) => warn!("Shutdown grace period elapsed, dropping open connections"),
    }

    if let Some(pool) = context.pool {
        pool.close().await;
        info!("Database pool closed");
    }

    info!("Discovery API shutdown complete");

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }

    if let Some(port) = args.port {
        config.server.port = port;
    }
}

/// Resolves after a shutdown signal plus the grace period
async fn drain_deadline(grace: Duration) {
    shutdown_signal().await;
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
