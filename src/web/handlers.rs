//! HTTP handlers shared by the main application and the ingestion service.

use super::error::{body_for, status_for, ApiError};
use super::render::{form_page, links_page, Notice};
use super::state::{AppState, Role};
use crate::delegation::{CreatedBody, ErrorBody, LinkSubmission};
use crate::error::Error;
use crate::store::{SortOrder, StoredLink};
use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Html,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rows returned by the listing endpoints when no limit is given.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Fields posted by the HTML form. Every field arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct FormSubmission {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub type_id: String,
    #[serde(default)]
    pub icon: String,
}

/// An unparseable category is dropped, not rejected.
impl From<FormSubmission> for LinkSubmission {
    fn from(form: FormSubmission) -> Self {
        LinkSubmission {
            description: form.description,
            url: form.url,
            type_id: form.type_id.trim().parse::<i64>().ok(),
            icon: Some(form.icon),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub order: SortOrder,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /`
pub async fn index(State(state): State<Arc<AppState>>) -> (StatusCode, Html<String>) {
    match state.store.categories().await {
        Ok(categories) => (StatusCode::OK, Html(form_page(&categories, None))),
        Err(e) => {
            tracing::error!("Loading categories failed: {}", e);
            let notice = Notice::Failure("Unable to reach the database".to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(form_page(&[], Some(&notice))),
            )
        }
    }
}

/// `POST /`
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<FormSubmission>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let result = match form {
        Ok(Form(form)) => state.writer.submit(&LinkSubmission::from(form)).await,
        Err(rejection) => Err(Error::InvalidLink(rejection.body_text())),
    };

    let (status, notice) = match result {
        Ok(created) => (
            StatusCode::CREATED,
            Notice::Success(format!("{} (#{})", created.message, created.id)),
        ),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Form submission failed: {}", e);
            }
            (status, Notice::Failure(body_for(&e).describe()))
        }
    };

    let categories = state.store.categories().await.unwrap_or_default();
    (status, Html(form_page(&categories, Some(&notice))))
}

/// `POST /api/addlink`
pub async fn add_link(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LinkSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let Json(submission) = payload.map_err(|rejection| {
        let msg = match rejection {
            JsonRejection::MissingJsonContentType(_) => "no JSON data received".to_string(),
            other => format!("malformed JSON body: {}", other.body_text()),
        };
        ApiError(Error::InvalidLink(msg))
    })?;

    let created = state.writer.submit(&submission).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedBody {
            message: created.message,
            id: created.id,
        }),
    ))
}

/// `GET /view`
pub async fn view(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let links = state
        .store
        .recent(SortOrder::Desc, DEFAULT_LIST_LIMIT)
        .await?;
    let categories = state.store.categories().await?;
    Ok(Html(links_page(&links, &categories)))
}

/// `GET /api/links?order=asc|desc&limit=N`
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<StoredLink>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(Json(state.store.recent(params.order, limit).await?))
}

/// `GET /health`
///
/// Healthy exactly when the store answers. The main application also
/// reports whether the ingestion service is answering, without letting that
/// affect its own status.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let ingest = match (state.role, state.writer.supervisor()) {
        (Role::Ingest, _) => None,
        (Role::App, None) => Some("disabled"),
        (Role::App, Some(supervisor)) if supervisor.is_running().await => Some("running"),
        (Role::App, Some(_)) => Some("down"),
    };

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                ingest,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "unavailable",
                    ingest,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}
