//! Liveness probing of the ingestion service.

mod checker;
mod http;

pub use checker::HealthChecker;
pub use http::{shared_client, HttpProbe};
