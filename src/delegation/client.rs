use super::protocol::{CreatedBody, ErrorBody, LinkSubmission, LINK_ADDED};
use crate::endpoint::ServiceEndpoint;
use crate::error::{Error, Result};
use crate::healthcheck::shared_client;
use crate::store::{LinkRecord, WriteStore};
use crate::supervisor::ProcessSupervisor;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Where a single submission is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePath {
    /// Delegate to the ingestion service at this endpoint.
    Remote(ServiceEndpoint),
    /// Insert through the local store.
    Direct,
}

impl fmt::Display for WritePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePath::Remote(endpoint) => write!(f, "remote ({})", endpoint),
            WritePath::Direct => write!(f, "direct"),
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCreated {
    pub message: String,
    pub id: i64,
    #[serde(skip)]
    pub path: WritePath,
}

/// Routes link submissions to the ingestion service when it is alive and to
/// the local store otherwise.
///
/// The path is chosen once per submission from a fresh liveness probe. Once
/// the remote path is chosen its failures are reported as they are; the
/// submission is not retried against the store, since the remote write may
/// already have been committed.
#[derive(Clone)]
pub struct DelegationClient {
    supervisor: Option<Arc<ProcessSupervisor>>,
    store: Arc<dyn WriteStore>,
    http: Client,
    write_timeout: Duration,
}

impl DelegationClient {
    pub fn new(
        supervisor: Option<Arc<ProcessSupervisor>>,
        store: Arc<dyn WriteStore>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            supervisor,
            store,
            http: shared_client().clone(),
            write_timeout,
        }
    }

    /// Client that always writes through the local store.
    pub fn direct(store: Arc<dyn WriteStore>) -> Self {
        Self::new(None, store, Duration::from_secs(10))
    }

    pub fn supervisor(&self) -> Option<&Arc<ProcessSupervisor>> {
        self.supervisor.as_ref()
    }

    /// Probe once and pick the write path.
    pub async fn resolve_path(&self) -> WritePath {
        match &self.supervisor {
            Some(supervisor) if supervisor.is_running().await => {
                WritePath::Remote(supervisor.endpoint().clone())
            }
            Some(supervisor) => {
                tracing::debug!(
                    "Ingestion service at {} not answering, writing directly",
                    supervisor.endpoint()
                );
                WritePath::Direct
            }
            None => WritePath::Direct,
        }
    }

    /// Validate and persist one link.
    #[tracing::instrument(skip(self, submission), fields(url = %submission.url))]
    pub async fn submit(&self, submission: &LinkSubmission) -> Result<LinkCreated> {
        let record = submission.validate()?;

        let path = self.resolve_path().await;
        let created = match &path {
            WritePath::Remote(endpoint) => self.write_remote(endpoint, &record).await?,
            WritePath::Direct => CreatedBody {
                id: self.store.insert(record).await?,
                message: LINK_ADDED.to_string(),
            },
        };

        tracing::info!("Link {} stored via {}", created.id, path);
        Ok(LinkCreated {
            message: created.message,
            id: created.id,
            path,
        })
    }

    async fn write_remote(
        &self,
        endpoint: &ServiceEndpoint,
        record: &LinkRecord,
    ) -> Result<CreatedBody> {
        let delegation_error = |reason: String| Error::Delegation {
            endpoint: endpoint.to_string(),
            reason,
        };

        let response = self
            .http
            .post(endpoint.add_link_url())
            .timeout(self.write_timeout)
            .json(&LinkSubmission::from(record))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    delegation_error(format!("no response within {:?}", self.write_timeout))
                } else {
                    delegation_error(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| delegation_error(format!("reading response: {}", e)))?;

        if status.is_success() {
            return serde_json::from_str::<CreatedBody>(&body).map_err(|e| {
                delegation_error(format!("unexpected response body ({}): {}", status, e))
            });
        }

        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.describe())
            .unwrap_or_else(|_| fallback_detail(status, &body));

        if status.is_client_error() {
            Err(Error::Rejected {
                status: status.as_u16(),
                message: detail,
            })
        } else {
            Err(delegation_error(format!("{}: {}", status, detail)))
        }
    }
}

fn fallback_detail(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::supervisor::Launcher;
    use async_trait::async_trait;
    use axum::{http::StatusCode, routing::get, routing::post, Json, Router};
    use std::sync::atomic::{AtomicI64, Ordering};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct CountingStore {
        inserted: AtomicI64,
    }

    #[async_trait]
    impl WriteStore for CountingStore {
        async fn insert(&self, _record: LinkRecord) -> Result<i64> {
            Ok(self.inserted.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn example() -> LinkSubmission {
        LinkSubmission::new("Example", "https://example.com")
            .with_type(1)
            .with_icon("x.png")
    }

    async fn remote(router: Router) -> ServiceEndpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ServiceEndpoint::new("127.0.0.1", port).unwrap()
    }

    fn client_for(endpoint: ServiceEndpoint, store: Arc<CountingStore>) -> DelegationClient {
        let config = IngestConfig {
            probe_timeout: Duration::from_millis(500),
            ..IngestConfig::default()
        };
        let supervisor = ProcessSupervisor::new(endpoint, &config, Launcher::new("true", ["x"]));
        DelegationClient::new(Some(Arc::new(supervisor)), store, Duration::from_secs(2))
    }

    fn healthy() -> Router {
        Router::new().route("/health", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn test_direct_client_writes_locally() {
        let store = Arc::new(CountingStore::default());
        let client = DelegationClient::direct(store.clone());

        assert_eq!(client.resolve_path().await, WritePath::Direct);
        let created = client.submit(&example()).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.path, WritePath::Direct);
        assert_eq!(created.message, LINK_ADDED);
        assert_eq!(store.inserted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_submission_never_writes() {
        let store = Arc::new(CountingStore::default());
        let client = DelegationClient::direct(store.clone());

        let err = client
            .submit(&LinkSubmission::new("", "https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLink(_)));
        assert_eq!(store.inserted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_success_skips_local_store() {
        let router = healthy().route(
            "/api/addlink",
            post(|Json(sub): Json<LinkSubmission>| async move {
                assert_eq!(sub.description, "Example");
                assert_eq!(sub.icon.as_deref(), Some("x.png"));
                (
                    StatusCode::CREATED,
                    Json(CreatedBody {
                        message: LINK_ADDED.into(),
                        id: 42,
                    }),
                )
            }),
        );
        let endpoint = remote(router).await;
        let store = Arc::new(CountingStore::default());
        let client = client_for(endpoint.clone(), store.clone());

        let created = client.submit(&example()).await.unwrap();
        assert_eq!(created.id, 42);
        assert_eq!(created.path, WritePath::Remote(endpoint));
        assert_eq!(store.inserted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_client_error_is_a_rejection() {
        let router = healthy().route(
            "/api/addlink",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody::new("Description and URL are required")),
                )
            }),
        );
        let store = Arc::new(CountingStore::default());
        let client = client_for(remote(router).await, store.clone());

        let err = client.submit(&example()).await.unwrap_err();
        match err {
            Error::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("required"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.inserted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_server_error_does_not_fall_back() {
        let router = healthy().route(
            "/api/addlink",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new("Internal server error").with_details("disk I/O error")),
                )
            }),
        );
        let store = Arc::new(CountingStore::default());
        let client = client_for(remote(router).await, store.clone());

        let err = client.submit(&example()).await.unwrap_err();
        assert!(matches!(err, Error::Delegation { .. }));
        assert!(err.to_string().contains("disk I/O error"));
        assert_eq!(store.inserted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_timeout_is_a_delegation_failure() {
        let router = healthy().route(
            "/api/addlink",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                StatusCode::CREATED
            }),
        );
        let endpoint = remote(router).await;
        let store = Arc::new(CountingStore::default());
        let supervisor = ProcessSupervisor::new(
            endpoint,
            &IngestConfig::default(),
            Launcher::new("true", ["x"]),
        );
        let client = DelegationClient::new(
            Some(Arc::new(supervisor)),
            store.clone(),
            Duration::from_millis(300),
        );

        let err = client.submit(&example()).await.unwrap_err();
        assert!(err.to_string().contains("no response within"), "{err}");
        assert_eq!(store.inserted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unhealthy_remote_uses_direct_path() {
        let router = Router::new().route(
            "/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "database down") }),
        );
        let store = Arc::new(CountingStore::default());
        let client = client_for(remote(router).await, store.clone());

        let created = client.submit(&example()).await.unwrap();
        assert_eq!(created.path, WritePath::Direct);
        assert_eq!(store.inserted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fallback_detail() {
        assert_eq!(fallback_detail(StatusCode::BAD_GATEWAY, "  "), "Bad Gateway");
        assert_eq!(fallback_detail(StatusCode::BAD_GATEWAY, "upstream"), "upstream");
    }
}
