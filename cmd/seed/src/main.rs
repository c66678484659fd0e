//! Creates the database schema and fills the animal registry, then exits.
//! Safe to run repeatedly.

use std::sync::Arc;

use anyhow::Context;
use configs::Settings;
use services::CatalogService;
use storage_adapters::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = SqliteStore::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("connecting to {}", settings.database.url))?;
    store.migrate().await.context("running migrations")?;

    let inserted = CatalogService::new(Arc::new(store))
        .ensure_seeded()
        .await
        .context("seeding animal registry")?;
    tracing::info!(inserted, "seed complete");
    Ok(())
}
