//! Workly - job board API server

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use crate::config::{Config, LogFormat};
use workly_api::{AppState, create_router};
use workly_db::Database;

/// Workly - job board API with user and company sessions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "WORKLY_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Secret for signing user session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Secret for signing company session tokens
    #[arg(long, env = "JWT_COMPANY_SECRET", hide_env_values = true)]
    jwt_company_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be read before clap looks at the environment
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::load(&args.config)?;

    if let Some(secret) = args.jwt_secret {
        config.auth.user_secret = Some(secret);
    }
    if let Some(secret) = args.jwt_company_secret {
        config.auth.company_secret = Some(secret);
    }

    init_logging(&config.logging.level, config.logging.format);

    info!("Starting Workly v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.user_secret.as_deref().is_none_or(str::is_empty) {
        warn!("No user signing secret configured; user sign-in will fail");
    }
    if config.auth.company_secret.as_deref().is_none_or(str::is_empty) {
        warn!("No company signing secret configured; company sign-in will fail");
    }
    if config.auth.shares_secret() {
        warn!("User and company signing secrets are identical; configure distinct values");
    }

    if let Some(dir) = config.database.parent_dir() {
        tokio::fs::create_dir_all(&dir).await?;
    }

    let db = Database::with_max_connections(&config.database.url, config.database.max_connections)
        .await?;

    let metrics_handle = if config.metrics.enabled {
        Some(Arc::new(PrometheusBuilder::new().install_recorder()?))
    } else {
        None
    };

    let state = AppState::new(
        db,
        config.auth.user_secret.as_deref(),
        config.auth.company_secret.as_deref(),
        config.auth.secure_cookies,
    );

    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stop_tx.send(true);
        })
        .into_future();

    tokio::select! {
        result = server => result?,
        _ = grace_expired(stop_rx, config.server.shutdown_grace()) => {
            warn!("Shutdown grace period elapsed, closing remaining connections");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}

/// Resolves `grace` after shutdown has been requested; never resolves otherwise
async fn grace_expired(mut stop: watch::Receiver<bool>, grace: Duration) {
    if stop.wait_for(|stopping| *stopping).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
