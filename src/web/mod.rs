//! HTTP surfaces of the main application and the ingestion service.
//!
//! - `handlers` - Route handlers shared by both processes
//! - `render` - HTML pages
//! - `state` - [`AppState`] and the process [`Role`]
//! - `error` - Mapping library errors to responses

mod error;
mod handlers;
mod render;
mod state;

pub use error::ApiError;
pub use handlers::{FormSubmission, HealthResponse, ListParams, DEFAULT_LIST_LIMIT};
pub use render::{escape_html, Notice};
pub use state::{AppState, Role};

use crate::endpoint::{ADD_LINK_PATH, HEALTH_PATH};
use crate::error::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Routes served by both processes.
fn base_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit_form))
        .route(ADD_LINK_PATH, post(handlers::add_link))
        .route(HEALTH_PATH, get(handlers::health))
}

fn finish(router: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    router
        .fallback(handlers::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

/// Router of the main application: the shared routes plus the listing pages.
pub fn app_router(state: Arc<AppState>) -> Router {
    let routes = base_routes()
        .route("/view", get(handlers::view))
        .route("/api/links", get(handlers::list_links));
    finish(routes, state)
}

/// Router of the ingestion service.
pub fn ingest_router(state: Arc<AppState>) -> Router {
    finish(base_routes(), state)
}

/// Bind `host:port`.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve `router` until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to create SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
