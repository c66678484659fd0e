//! # Wildlog
//!
//! Assembles the adapters into a running server: settings, tracing, the
//! SQLite store, registry seeding, photo storage and the HTTP router.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState, RouterConfig};
use configs::{LogFormat, Settings};
use services::{CatalogService, RecordService};
use storage_adapters::{LocalPhotoStore, SqliteStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(settings.log.format);

    // 1. Store: connect, migrate, make sure the animal registry is populated
    let store = SqliteStore::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("connecting to {}", settings.database.url))?;
    store.migrate().await.context("running migrations")?;
    let store = Arc::new(store);

    CatalogService::new(store.clone())
        .ensure_seeded()
        .await
        .context("seeding animal registry")?;

    // 2. Photos
    let upload_dir = PathBuf::from(&settings.media.upload_dir);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", upload_dir.display()))?;
    let photos = Arc::new(LocalPhotoStore::new(
        upload_dir.clone(),
        settings.media.url_prefix.clone(),
    ));

    // 3. Services and routes
    let records = RecordService::new(store.clone(), store.clone(), store, photos);
    let app = router(
        AppState::new(Arc::new(records)),
        RouterConfig {
            upload_dir,
            url_prefix: settings.media.url_prefix.clone(),
            max_upload_bytes: settings.media.max_upload_bytes,
        },
    );

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "wildlog listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("wildlog stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
