//! aircast radio daemon (aircast-rd) - Main entry point
//!
//! Streams audio objects from the media bucket into a live RTP pipeline
//! in an endless loop and serves the observer HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aircast_common::events::NowPlayingBus;
use aircast_rd::catalog::Catalog;
use aircast_rd::config::Config;
use aircast_rd::player::PlayerEngine;
use aircast_rd::storage::{ObjectStore, S3ObjectStore};
use aircast_rd::streamer::TrackStreamer;
use aircast_rd::{api, db, pipeline};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for aircast-rd
#[derive(Parser, Debug)]
#[command(name = "aircast-rd")]
#[command(about = "Radio daemon: streams a storage bucket over RTP")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "AIRCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long, env = "AIRCAST_RD_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("aircast_rd={},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = args.port.unwrap_or(config.port);
    info!("Starting aircast radio daemon on port {}", port);

    // Metadata database
    let db_pool = db::init_db(&config.database_path)
        .await
        .context("Failed to open track metadata database")?;

    // Object storage client
    let storage: Arc<dyn ObjectStore> = Arc::new(
        S3ObjectStore::new(&config.storage)
            .await
            .context("Failed to construct object storage client")?,
    );

    // Transport pipeline: the one component the daemon cannot run without
    let sink = pipeline::build(&config.stream).context("Failed to start transport pipeline")?;

    let bus = Arc::new(NowPlayingBus::new(64));

    // Playback loop on its own task
    let catalog = Catalog::new(Arc::clone(&storage), config.storage.media_bucket.clone());
    let streamer = TrackStreamer::new(
        Arc::clone(&storage),
        Arc::clone(&sink),
        config.storage.media_bucket.clone(),
        config.stream.chunk_size,
    );
    let engine = PlayerEngine::new(
        catalog,
        streamer,
        Arc::clone(&bus),
        Arc::clone(&sink),
        Duration::from_secs(config.stream.idle_poll_secs),
    )
    .await;
    let player = engine.handle();
    let player_task = tokio::spawn(engine.run());
    info!("Playback loop started");

    // HTTP server
    let app = api::create_router(api::AppState {
        db: db_pool,
        bus: Arc::clone(&bus),
        cover_public_url: config.storage.cover_public_url.clone(),
        port,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the playback loop; it signals end-of-stream on the way out
    info!("Stopping playback loop");
    player.stop();
    let _ = player_task.await;

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
