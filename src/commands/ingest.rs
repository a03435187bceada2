use super::Settings;
use slink::web::{self, AppState};
use slink::SqliteLinkStore;

/// Run the ingestion service until SIGINT/SIGTERM.
pub async fn run_ingest(
    settings: &Settings,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let config = &settings.config;
    let host = host.unwrap_or_else(|| config.ingest.host.clone());
    let port = port.unwrap_or(config.ingest.port);

    let store = SqliteLinkStore::open(&config.database).await?;
    tracing::info!(
        "Ingestion service writing to {}",
        store.db_path().display()
    );

    let listener = web::bind(&host, port).await?;
    web::serve(
        listener,
        web::ingest_router(AppState::ingest(store)),
        web::shutdown_signal(),
    )
    .await?;

    tracing::info!("Ingestion service stopped");
    Ok(())
}
