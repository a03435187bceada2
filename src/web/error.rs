use crate::delegation::ErrorBody;
use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Status code a failed submission is answered with.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidLink(_) => StatusCode::BAD_REQUEST,
        Error::Rejected { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wire body for a failed submission. Client errors carry only their
/// message; server errors add the underlying cause as `details`.
pub fn body_for(err: &Error) -> ErrorBody {
    match err {
        Error::InvalidLink(msg) => ErrorBody::new(capitalize(msg)),
        Error::Rejected { message, .. } => ErrorBody::new(message.clone()),
        other => ErrorBody::new("Error processing the request").with_details(other.to_string()),
    }
}

/// JSON error response for the API routes.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }
        (status, Json(body_for(&self.0))).into_response()
    }
}

fn capitalize(msg: &str) -> String {
    let mut chars = msg.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
