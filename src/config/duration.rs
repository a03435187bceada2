//! Human-readable durations in the configuration file.
//!
//! Timing knobs such as `startup_interval: "1s"` or `write_timeout: "10s"` are
//! written as strings and turned into [`Duration`]s while deserializing.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Parse a duration string like "10s", "30s", "1m", "500ms".
///
/// A bare number is read as seconds. Returns `None` if the string cannot be
/// parsed.
///
/// ```
/// use slink::config::parse_duration_string;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration_string("2s"), Some(Duration::from_secs(2)));
/// assert_eq!(parse_duration_string("250ms"), Some(Duration::from_millis(250)));
/// assert_eq!(parse_duration_string("1m"), Some(Duration::from_secs(60)));
/// ```
pub fn parse_duration_string(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Render a duration the way it would be written in the config file.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis % 1000 != 0 {
        format!("{}ms", millis)
    } else {
        format!("{}s", d.as_secs())
    }
}

/// `#[serde(with = "...")]` adapter for duration strings.
pub mod human {
    use super::*;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_duration_string(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid duration '{}': expected forms like \"500ms\", \"2s\" or \"1m\"",
                raw
            ))
        })
    }
}
