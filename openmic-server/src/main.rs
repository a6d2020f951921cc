//! openmic-server binary entry point.

use anyhow::Context;
use clap::Parser;
use openmic_server::{build_router, ApiSettings, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(author, version, about = "Karaoke request API server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "4000", env = "PORT")]
    port: u16,

    /// Path to the SQLite database
    #[arg(short, long, default_value = "openmic.db", env = "DATABASE_PATH")]
    database: PathBuf,

    /// Shared secret for the admin endpoints
    #[arg(long, env = "ADMIN_KEY")]
    admin_key: Option<String>,

    /// Allowed CORS origin, `*` for any
    #[arg(long, default_value = "*", env = "CLIENT_ORIGIN")]
    client_origin: String,

    /// Upper bound for the `limit` query parameter on /api/songs
    #[arg(long, default_value = "2000", env = "SONGS_MAX_LIMIT")]
    songs_max_limit: i64,

    /// Reject unknown source/performer values instead of coercing them
    #[arg(long, env = "STRICT_ENUMS")]
    strict_enums: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openmic_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting openmic-server v{}", env!("CARGO_PKG_VERSION"));

    let db = openmic_common::db::init_database(&args.database)
        .await
        .context("Failed to initialize database")?;

    if args.admin_key.is_none() {
        warn!("ADMIN_KEY is not set; admin endpoints will refuse every call");
    }

    let settings = ApiSettings {
        admin_key: args.admin_key,
        client_origin: args.client_origin,
        songs_max_limit: args.songs_max_limit.max(1),
        strict_enums: args.strict_enums,
    };
    let state = AppState::new(db, settings);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
