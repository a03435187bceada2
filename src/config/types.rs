//! Core configuration types.
//!
//! This module contains the root [`Config`] struct loaded from `slink.yaml`.
//! Every section is optional; missing keys fall back to the defaults below.

use super::duration::human;
use crate::endpoint::ServiceEndpoint;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure for slink.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub log: LogMode,

    /// Log file used when `log` is `file` or `all`
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// SQL file used to provision a new database. The bundled schema is used
    /// when this is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
}

/// Listen address of the main web application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// The supervised link-ingestion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Spawn and delegate to the ingestion service from `slink serve`
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_ingest_port")]
    pub port: u16,

    /// Where the spawned service writes its logs
    #[serde(default = "default_ingest_log_file")]
    pub log_file: PathBuf,

    /// Liveness probes attempted after spawning before giving up
    #[serde(default = "default_startup_attempts")]
    pub startup_attempts: u32,

    #[serde(default = "default_startup_interval", with = "human")]
    pub startup_interval: Duration,

    /// Time between SIGTERM and SIGKILL when stopping the service
    #[serde(default = "default_grace_period", with = "human")]
    pub grace_period: Duration,

    /// Timeout of a liveness probe made while handling a request
    #[serde(default = "default_probe_timeout", with = "human")]
    pub probe_timeout: Duration,

    /// Timeout of a delegated write
    #[serde(default = "default_write_timeout", with = "human")]
    pub write_timeout: Duration,
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    Screen,
    File,
    All,
}

impl LogMode {
    pub fn to_screen(self) -> bool {
        matches!(self, LogMode::Screen | LogMode::All)
    }

    pub fn to_file(self) -> bool {
        matches!(self, LogMode::File | LogMode::All)
    }
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogMode::Screen => write!(f, "screen"),
            LogMode::File => write!(f, "file"),
            LogMode::All => write!(f, "all"),
        }
    }
}

impl FromStr for LogMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "screen" => Ok(LogMode::Screen),
            "file" => Ok(LogMode::File),
            "all" => Ok(LogMode::All),
            other => Err(Error::Parse(format!(
                "unknown log mode '{}': expected screen, file or all",
                other
            ))),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_ingest_port() -> u16 {
    5001
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./db/links.db")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("slink.log")
}

fn default_ingest_log_file() -> PathBuf {
    PathBuf::from("addlink.log")
}

fn default_startup_attempts() -> u32 {
    30
}

fn default_startup_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_grace_period() -> Duration {
    Duration::from_secs(5)
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_write_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            schema: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_server_port(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_ingest_port(),
            log_file: default_ingest_log_file(),
            startup_attempts: default_startup_attempts(),
            startup_interval: default_startup_interval(),
            grace_period: default_grace_period(),
            probe_timeout: default_probe_timeout(),
            write_timeout: default_write_timeout(),
        }
    }
}

impl IngestConfig {
    pub fn endpoint(&self) -> Result<ServiceEndpoint> {
        ServiceEndpoint::new(self.host.clone(), self.port)
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.database.path.as_os_str().is_empty() {
            problems.push("database.path must not be empty".to_string());
        }
        if self.server.host.trim().is_empty() {
            problems.push("server.host must not be empty".to_string());
        }
        if self.server.port == 0 {
            problems.push("server.port must not be 0".to_string());
        }
        if self.ingest.host.trim().is_empty() {
            problems.push("ingest.host must not be empty".to_string());
        }
        if self.ingest.port == 0 {
            problems.push("ingest.port must not be 0".to_string());
        }
        if self.ingest.enabled
            && self.ingest.host.trim() == self.server.host.trim()
            && self.ingest.port == self.server.port
        {
            problems.push(format!(
                "ingest and server both listen on {}:{}",
                self.server.host, self.server.port
            ));
        }
        if self.ingest.startup_attempts == 0 {
            problems.push("ingest.startup_attempts must be at least 1".to_string());
        }
        if self.ingest.startup_interval.is_zero() {
            problems.push("ingest.startup_interval must be greater than zero".to_string());
        }
        if self.ingest.probe_timeout.is_zero() {
            problems.push("ingest.probe_timeout must be greater than zero".to_string());
        }
        if self.ingest.write_timeout.is_zero() {
            problems.push("ingest.write_timeout must be greater than zero".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems.join("; ")))
        }
    }
}
