use super::Settings;
use crate::output::UserOutput;
use slink::web::{self, AppState};
use slink::{DelegationClient, ProcessSupervisor, SqliteLinkStore, StartOutcome};
use std::sync::Arc;

/// Run the main web application until SIGINT/SIGTERM.
///
/// The ingestion service is started first. If it cannot be brought up the
/// application still serves and every submission takes the direct path.
pub async fn run_serve(
    settings: &Settings,
    host: Option<String>,
    port: Option<u16>,
    no_ingest: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let config = &settings.config;
    let store = SqliteLinkStore::open(&config.database).await?;
    tracing::info!("Database: {}", store.db_path().display());

    // Listening from here on, so a Ctrl+C during the startup wait still
    // reaches the cleanup below.
    let mut shutdown = Box::pin(web::shutdown_signal());

    let supervisor = if config.ingest.enabled && !no_ingest {
        let supervisor = Arc::new(ProcessSupervisor::from_config(
            &config.ingest,
            settings.config_path.as_deref(),
        )?);

        out.progress(&format!("Ingestion service at {}: ", supervisor.endpoint()));
        let started = tokio::select! {
            started = supervisor.start() => started,
            _ = &mut shutdown => {
                out.finish_progress("aborted");
                out.status("Startup aborted. Cleaning up...");
                if let Err(e) = supervisor.stop().await {
                    tracing::warn!("Failed to stop ingestion service: {}", e);
                }
                return Ok(());
            }
        };
        match started {
            Ok(StartOutcome::Spawned { pid }) => {
                out.finish_progress(&format!("started (pid {})", pid));
            }
            Ok(StartOutcome::AlreadyOwned { pid }) => {
                out.finish_progress(&format!("running (pid {})", pid));
            }
            Ok(StartOutcome::External) => {
                out.finish_progress("already running, not managed by this process");
            }
            Err(e) => {
                out.finish_progress("unavailable");
                out.warning(&format!("  {}", e.with_suggestion()));
                tracing::warn!("Continuing without the ingestion service: {}", e);
            }
        }
        Some(supervisor)
    } else {
        tracing::info!("Ingestion service disabled, writing directly");
        None
    };

    let writer = DelegationClient::new(
        supervisor.clone(),
        Arc::new(store.clone()),
        config.ingest.write_timeout,
    );
    let router = web::app_router(AppState::app(store, writer));

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let served = match web::bind(&host, port).await {
        Ok(listener) => {
            out.status(&format!("Serving on http://{}:{}", host, port));
            web::serve(listener, router, shutdown).await
        }
        Err(e) => Err(e),
    };

    if let Some(supervisor) = supervisor {
        out.status("Stopping ingestion service...");
        if let Err(e) = supervisor.stop().await {
            tracing::warn!("Failed to stop ingestion service: {}", e);
        }
    }

    served?;
    tracing::info!("Server shutdown complete");
    Ok(())
}
