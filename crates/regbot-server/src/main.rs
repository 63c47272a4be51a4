use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use regbot_core::RecordStore;
use regbot_core::config::load_config;
use regbot_core::tracing_init::{DEFAULT_FILTER, init_tracing};
use regbot_server::notifier::Notifier;
use regbot_server::routes::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "regbot-server")]
#[command(version, about = "Registration approval backend with a Telegram admin bot")]
struct Args {
    /// JSON settings file. Environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Directory for registration records (overrides DATA_DIR).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory containing index.html, soon.html and public/ (overrides SITE_ROOT).
    #[arg(long)]
    site_root: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(DEFAULT_FILTER, args.log_json);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.data_dir {
        config.server.data_dir = dir;
    }
    if let Some(dir) = args.site_root {
        config.server.site_root = dir;
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        site_root = %config.server.site_root.display(),
        "Starting regbot-server"
    );

    let store = RecordStore::open(&config.server.data_dir).await?;
    let notifier = Notifier::new(config.telegram.clone())?;
    if !notifier.is_configured() {
        warn!("TG_BOT_TOKEN or TG_ADMIN_CHAT_ID not set; admin notifications are disabled");
    }

    let app = build_router(
        AppState {
            store,
            notifier: Arc::new(notifier),
        },
        &config.server,
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "HTTP server ready");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C shutdown signal");
        }
        () = sigterm => {
            info!("Received SIGTERM shutdown signal");
        }
    }
}
