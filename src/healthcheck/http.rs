use super::HealthChecker;
use crate::endpoint::ServiceEndpoint;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

/// Global shared HTTP client for liveness probes.
///
/// The request handler probes the ingestion service on every submission, so
/// the connection pool is shared instead of building a client per probe.
/// Individual requests set their own timeout; the client-level one is only a
/// backstop.
static SHARED_HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Get or create the shared HTTP client.
///
/// Falls back to a default client if the builder fails, which only happens
/// when the TLS backend cannot initialize.
pub fn shared_client() -> &'static Client {
    SHARED_HTTP_CLIENT
        .get_or_init(|| build_client(Duration::from_secs(30)).unwrap_or_else(|_| Client::new()))
}

/// HTTP liveness probe against an endpoint's `/health`.
#[derive(Clone)]
pub struct HttpProbe {
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpProbe {
    /// Probe using the process-wide shared client.
    pub fn new(endpoint: &ServiceEndpoint, timeout: Duration) -> Self {
        Self {
            url: endpoint.health_url(),
            client: shared_client().clone(),
            timeout,
        }
    }

    /// Probe with a dedicated client.
    pub fn with_own_client(endpoint: &ServiceEndpoint, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: endpoint.health_url(),
            client: build_client(timeout)?,
            timeout,
        })
    }

    /// Same target, different per-request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            url: self.url.clone(),
            client: self.client.clone(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HealthChecker for HttpProbe {
    async fn check(&self) -> bool {
        match self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    tracing::debug!("{} answered {}", self.url, response.status());
                }
                healthy
            }
            Err(e) => {
                tracing::trace!("probe of {} failed: {}", self.url, e);
                false
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> ServiceEndpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ServiceEndpoint::new("127.0.0.1", port).unwrap()
    }

    async fn unused_endpoint() -> ServiceEndpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        ServiceEndpoint::new("127.0.0.1", port).unwrap()
    }

    #[tokio::test]
    async fn test_probe_unreachable_port() {
        let probe = HttpProbe::new(&unused_endpoint().await, Duration::from_secs(1));
        assert!(!probe.check().await);
    }

    #[tokio::test]
    async fn test_probe_healthy_endpoint() {
        let ep = serve(Router::new().route("/health", get(|| async { "ok" }))).await;
        let probe = HttpProbe::new(&ep, Duration::from_secs(2));
        assert!(probe.check().await);
        assert_eq!(probe.url(), format!("{}/health", ep.base_url()));
    }

    #[tokio::test]
    async fn test_probe_non_success_status_is_unhealthy() {
        let ep = serve(Router::new().route(
            "/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "db down") }),
        ))
        .await;
        let probe = HttpProbe::with_own_client(&ep, Duration::from_secs(2)).unwrap();
        assert!(!probe.check().await);
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let ep = serve(Router::new().route(
            "/health",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        ))
        .await;
        let probe = HttpProbe::new(&ep, Duration::from_millis(200));

        let started = std::time::Instant::now();
        assert!(!probe.check().await);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_with_timeout_keeps_target() {
        let ep = unused_endpoint().await;
        let probe = HttpProbe::new(&ep, Duration::from_secs(2));
        let quick = probe.with_timeout(Duration::from_millis(100));
        assert_eq!(quick.url(), probe.url());
        assert_eq!(quick.timeout(), Duration::from_millis(100));
        assert_eq!(probe.timeout(), Duration::from_secs(2));
    }
}
