use crate::error::{Error, Result};
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format of the `links.date` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A link ready to be persisted.
///
/// Construct through [`LinkRecord::new`], which enforces that description and
/// url are non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub timestamp: NaiveDateTime,
    pub description: String,
    pub url: String,
    pub type_id: Option<i64>,
    pub icon: String,
}

impl LinkRecord {
    /// Validate and normalize a submission, stamping it with the local time.
    pub fn new(
        description: &str,
        url: &str,
        type_id: Option<i64>,
        icon: Option<&str>,
    ) -> Result<Self> {
        let description = description.trim();
        let url = url.trim();

        match (description.is_empty(), url.is_empty()) {
            (true, true) => {
                return Err(Error::InvalidLink(
                    "a description and a URL are required".to_string(),
                ))
            }
            (true, false) => {
                return Err(Error::InvalidLink("a description is required".to_string()))
            }
            (false, true) => return Err(Error::InvalidLink("a URL is required".to_string())),
            (false, false) => {}
        }

        Ok(Self {
            // stored with microsecond precision
            timestamp: Local::now().naive_local().trunc_subsecs(6),
            description: description.to_string(),
            url: url.to_string(),
            type_id,
            icon: icon.map(str::trim).unwrap_or_default().to_string(),
        })
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// A link as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLink {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub url: String,
    pub type_id: Option<i64>,
    pub icon: String,
}

/// Row of the `type` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::Parse(format!("unknown sort order '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_trims_fields() {
        let record =
            LinkRecord::new("  Example ", " https://example.com\n", Some(1), Some(" x.png ")).unwrap();
        assert_eq!(record.description, "Example");
        assert_eq!(record.url, "https://example.com");
        assert_eq!(record.type_id, Some(1));
        assert_eq!(record.icon, "x.png");
    }

    #[test]
    fn test_record_icon_defaults_to_empty() {
        let record = LinkRecord::new("Example", "https://example.com", None, None).unwrap();
        assert_eq!(record.icon, "");
        assert_eq!(record.type_id, None);
    }

    #[test]
    fn test_record_rejects_blank_fields() {
        for (desc, url) in [("", "https://example.com"), ("Example", "  "), (" ", "")] {
            let err = LinkRecord::new(desc, url, None, None).unwrap_err();
            assert!(matches!(err, Error::InvalidLink(_)), "{desc:?}/{url:?}");
        }
    }

    #[test]
    fn test_timestamp_format_round_trips() {
        let record = LinkRecord::new("Example", "https://example.com", None, None).unwrap();
        let text = record.timestamp_string();
        let parsed = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parsed, record.timestamp);
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
