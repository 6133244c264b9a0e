use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use bucketree::config::Config;
use bucketree::index::snapshot::{snapshot_cell, spawn_refresher};
use bucketree::index::Indexer;
use bucketree::infra::s3::S3ObjectStore;
use bucketree::server::{AppState, router};

#[derive(Parser)]
#[command(about = "Serves a bucket as a browsable directory tree")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).map_err(io::Error::other)?;
    let public_base_url = config.public_base_url().map_err(io::Error::other)?;

    let store = S3ObjectStore::new(&config.storage).map_err(io::Error::other)?;
    // A dead bucket at startup is a configuration problem, not something to
    // retry through.
    store.check().await.map_err(io::Error::other)?;
    tracing::info!(bucket = %config.storage.bucket, "connected to storage");

    let (publisher, handle) = snapshot_cell();
    let indexer = Indexer::new(Arc::new(store), &config.meta_filename);
    let shutdown = CancellationToken::new();
    let refresher = spawn_refresher(
        indexer,
        publisher,
        config.refresh_interval(),
        shutdown.clone(),
    );

    let state = AppState {
        snapshot: handle,
        public_base_url: Arc::new(public_base_url),
    };
    let listener = TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    let _ = refresher.await;
    tracing::info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    // Serve until interrupted; signal registration failing means we can only
    // run until killed.
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
