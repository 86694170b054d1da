use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use error_common::{Result, VitalWatchError};
use vitalwatch_server::{create_app, set_expose_internal_errors, AppState, ServerConfig};

/// VitalWatch HTTP Server
#[derive(Parser, Debug)]
#[command(name = "vitalwatch-server")]
#[command(about = "Patient vital-sign monitoring HTTP API server")]
struct Args {
    /// Server bind address (overrides config)
    #[arg(long, env = "VITALWATCH_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long, env = "VITALWATCH_PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = "vitalwatch.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config)?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    init_tracing(args.verbose, config.environment.is_production())?;
    info!(version = env!("CARGO_PKG_VERSION"), environment = ?config.environment, "Starting VitalWatch server");

    config.validate()?;
    set_expose_internal_errors(!config.environment.is_production());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| VitalWatchError::ConfigError(format!("invalid bind address: {e}")))?;
    let grace = config.shutdown_grace();

    let state = AppState::from_config(config).await?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| VitalWatchError::NetworkError(format!("Failed to bind to {addr}: {e}")))?;

    info!(address = %addr, "VitalWatch server listening");
    info!("API docs available at http://{addr}/swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|e| VitalWatchError::ServerError(format!("HTTP server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(verbose: bool, production: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("vitalwatch_server={level},audit={level},tower_http={level},sqlx=warn").into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if production {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_level(true),
            )
            .try_init()
    };

    result.map_err(|e| VitalWatchError::ConfigError(format!("failed to initialise tracing: {e}")))
}

/// Resolve on SIGINT or SIGTERM, then arm a hard deadline for draining
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    info!(grace_secs = grace.as_secs(), "Shutdown requested; draining in-flight requests");

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!("Grace period elapsed; forcing exit");
        std::process::exit(1);
    });
}
