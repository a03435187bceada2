#![allow(unused_assignments)]

//! # slink
//!
//! A personal link bookmarking service. Links are written either through a
//! supervised, separately-running ingestion service or, when that service is
//! not answering, directly to the shared SQLite database.
//!
//! ## Components
//!
//! - **[`ProcessSupervisor`]**: spawns the ingestion service, waits for it to
//!   become healthy, and terminates it on shutdown
//! - **[`HttpProbe`]**: one-shot liveness check against `/health`
//! - **[`DelegationClient`]**: picks a [`WritePath`] per submission and runs it
//! - **[`WriteStore`]**: single-statement link insertion
//!
//! ## Quick Start
//!
//! ```no_run
//! use slink::{DelegationClient, LinkSubmission, Parser, SqliteLinkStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), slink::Error> {
//! let config = Parser::new().load_config("slink.yaml")?;
//! let store = SqliteLinkStore::open(&config.database).await?;
//!
//! let client = DelegationClient::direct(Arc::new(store));
//! let created = client
//!     .submit(&LinkSubmission::new("Example", "https://example.com"))
//!     .await?;
//! println!("{} (id {})", created.message, created.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! The main application and the ingestion service share no memory. They talk
//! over HTTP with explicit timeouts and both write to the same SQLite file in
//! WAL mode, one autocommitted statement per link.

pub mod config;
pub mod delegation;
pub mod endpoint;
pub mod error;
pub mod healthcheck;
pub mod store;
pub mod supervisor;
pub mod web;

// Re-export commonly used types
pub use config::{Config, IngestConfig, LogMode, Parser};
pub use delegation::{DelegationClient, LinkCreated, LinkSubmission, WritePath};
pub use endpoint::ServiceEndpoint;
pub use error::{Error, Result};
pub use healthcheck::{HealthChecker, HttpProbe};
pub use store::{LinkRecord, SortOrder, SqliteLinkStore, WriteStore};
pub use supervisor::{Launcher, ProcessSupervisor, StartOutcome};
