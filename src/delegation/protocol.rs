//! JSON bodies of the write delegation protocol (`POST /api/addlink`).

use crate::error::Result;
use crate::store::LinkRecord;
use serde::{Deserialize, Serialize};

/// Message returned with every successful write.
pub const LINK_ADDED: &str = "Link added successfully!";

/// A link as submitted by a form, the JSON API or the CLI.
///
/// Missing fields deserialize as empty so that they are reported as
/// validation failures rather than parse errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSubmission {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl LinkSubmission {
    pub fn new(description: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_id: i64) -> Self {
        self.type_id = Some(type_id);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Trim and check required fields.
    pub fn validate(&self) -> Result<LinkRecord> {
        LinkRecord::new(
            &self.description,
            &self.url,
            self.type_id,
            self.icon.as_deref(),
        )
    }
}

impl From<&LinkRecord> for LinkSubmission {
    fn from(record: &LinkRecord) -> Self {
        Self {
            description: record.description.clone(),
            url: record.url.clone(),
            type_id: record.type_id,
            icon: Some(record.icon.clone()),
        }
    }
}

/// `201` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBody {
    pub message: String,
    pub id: i64,
}

/// `4xx`/`5xx` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// `error`, followed by `details` when present.
    pub fn describe(&self) -> String {
        match &self.details {
            Some(details) => format!("{}: {}", self.error, details),
            None => self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let sub: LinkSubmission = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(sub.description, "");
        assert_eq!(sub.type_id, None);
        assert!(sub.validate().is_err());
    }

    #[test]
    fn test_null_type_id() {
        let sub: LinkSubmission = serde_json::from_str(
            r#"{"description": "Example", "url": "https://example.com", "type_id": null, "icon": "x.png"}"#,
        )
        .unwrap();
        let record = sub.validate().unwrap();
        assert_eq!(record.type_id, None);
        assert_eq!(record.icon, "x.png");
    }

    #[test]
    fn test_error_body_wire_format() {
        let body = ErrorBody::new("Internal server error");
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Internal server error"}"#
        );

        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "boom", "details": "disk full"}"#).unwrap();
        assert_eq!(body.describe(), "boom: disk full");
    }
}
