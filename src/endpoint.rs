//! Network address of the ingestion service.

use crate::error::{Error, Result};
use std::fmt;

/// Path of the liveness endpoint served by the ingestion service.
pub const HEALTH_PATH: &str = "/health";
/// Path of the write endpoint served by the ingestion service.
pub const ADD_LINK_PATH: &str = "/api/addlink";

/// Host and port of an HTTP service, plus the base address derived from them.
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    host: String,
    port: u16,
    base_url: String,
}

impl ServiceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        let host = host.trim().to_string();
        if host.is_empty() {
            return Err(Error::Validation("endpoint host must not be empty".into()));
        }
        if port == 0 {
            return Err(Error::Validation(format!(
                "endpoint {}: port must not be 0",
                host
            )));
        }

        // IPv6 literals need brackets inside a URL
        let base_url = if host.contains(':') && !host.starts_with('[') {
            format!("http://[{}]:{}", host, port)
        } else {
            format!("http://{}:{}", host, port)
        };
        url::Url::parse(&base_url)
            .map_err(|e| Error::Validation(format!("invalid endpoint '{}': {}", base_url, e)))?;

        Ok(Self {
            host,
            port,
            base_url,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, HEALTH_PATH)
    }

    pub fn add_link_url(&self) -> String {
        format!("{}{}", self.base_url, ADD_LINK_PATH)
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_urls() {
        let ep = ServiceEndpoint::new("127.0.0.1", 5001).unwrap();
        assert_eq!(ep.base_url(), "http://127.0.0.1:5001");
        assert_eq!(ep.health_url(), "http://127.0.0.1:5001/health");
        assert_eq!(ep.add_link_url(), "http://127.0.0.1:5001/api/addlink");
        assert_eq!(ep.to_string(), "http://127.0.0.1:5001");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let ep = ServiceEndpoint::new("::1", 8080).unwrap();
        assert_eq!(ep.base_url(), "http://[::1]:8080");
        assert_eq!(ep.host(), "::1");
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        assert!(ServiceEndpoint::new("", 5001).is_err());
        assert!(ServiceEndpoint::new("   ", 5001).is_err());
        assert!(ServiceEndpoint::new("localhost", 0).is_err());
        assert!(ServiceEndpoint::new("bad host", 80).is_err());
    }
}
