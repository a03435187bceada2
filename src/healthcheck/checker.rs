use async_trait::async_trait;
use std::time::Duration;

/// Liveness check for a service.
///
/// Implementations never return an error: anything short of an affirmative
/// answer within [`timeout`](Self::timeout) is reported as `false`.
#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// Check if the service is healthy right now
    async fn check(&self) -> bool;

    /// Upper bound on how long a single check may take
    fn timeout(&self) -> Duration;
}
