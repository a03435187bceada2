//! Lifecycle of the separately-running ingestion service.
//!
//! - `launch` - The command line used to start the service
//! - `process` - [`ProcessSupervisor`]: start, stop and liveness

mod launch;
mod process;

pub use launch::Launcher;
pub use process::{ProcessSupervisor, StartOutcome};
