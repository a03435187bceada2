//! Persistence of links.
//!
//! [`WriteStore`] is the single write seam shared by the direct fallback path
//! of the main application and by the ingestion service itself. Reads used by
//! the web views live on [`SqliteLinkStore`] directly.

mod sqlite;
mod types;

pub use sqlite::{SqliteLinkStore, BUNDLED_SCHEMA, MAX_LIST_LIMIT};
pub use types::{Category, LinkRecord, SortOrder, StoredLink, TIMESTAMP_FORMAT};

use crate::error::Result;
use async_trait::async_trait;

/// Durable insertion of a single validated link.
#[async_trait]
pub trait WriteStore: Send + Sync {
    /// Insert `record` atomically and return the new row id.
    async fn insert(&self, record: LinkRecord) -> Result<i64>;
}
