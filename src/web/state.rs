use crate::delegation::DelegationClient;
use crate::store::SqliteLinkStore;
use std::sync::Arc;

/// Which process a router is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The user-facing application, delegating writes when it can.
    App,
    /// The ingestion service, always writing to its own store.
    Ingest,
}

/// Shared application state handed to every handler.
pub struct AppState {
    pub role: Role,
    /// Reads for the form and listing pages, and the liveness ping.
    pub store: SqliteLinkStore,
    /// The only write path handlers use.
    pub writer: DelegationClient,
}

impl AppState {
    /// State of the main application.
    pub fn app(store: SqliteLinkStore, writer: DelegationClient) -> Arc<Self> {
        Arc::new(Self {
            role: Role::App,
            store,
            writer,
        })
    }

    /// State of the ingestion service: every write goes straight to `store`.
    pub fn ingest(store: SqliteLinkStore) -> Arc<Self> {
        let writer = DelegationClient::direct(Arc::new(store.clone()));
        Arc::new(Self {
            role: Role::Ingest,
            store,
            writer,
        })
    }
}
