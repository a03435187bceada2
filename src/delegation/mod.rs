//! Choosing between the ingestion service and the local store for writes.
//!
//! - `protocol` - JSON bodies shared by client and server
//! - `client` - [`DelegationClient`] and the per-request [`WritePath`]

mod client;
mod protocol;

pub use client::{DelegationClient, LinkCreated, WritePath};
pub use protocol::{CreatedBody, ErrorBody, LinkSubmission, LINK_ADDED};
