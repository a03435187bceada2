// thiserror's expansion of struct variants trips unused_assignments even
// though the fields are read by Display.
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(slink::config::error),
        help("Check slink.yaml, or point to another file with --config")
    )]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(slink::config::validation),
        help("Run `slink doctor` to inspect the loaded configuration")
    )]
    Validation(String),

    /// A submission was rejected before any write was attempted.
    #[error("Invalid link: {0}")]
    #[diagnostic(code(slink::link::invalid))]
    InvalidLink(String),

    /// The ingestion service answered the delegated write with a client error.
    #[error("Ingestion service rejected the link ({status}): {message}")]
    #[diagnostic(code(slink::delegate::rejected))]
    Rejected { status: u16, message: String },

    /// The delegated write failed at the transport level or with a server error.
    #[error("Delegated write to {endpoint} failed: {reason}")]
    #[diagnostic(
        code(slink::delegate::failed),
        help("The write may still have been committed by the ingestion service; check /view before retrying")
    )]
    Delegation { endpoint: String, reason: String },

    #[error("Ingestion service failed to start: {0}")]
    #[diagnostic(
        code(slink::supervisor::start_failed),
        help("Check the ingestion log file configured under `ingest.log_file`")
    )]
    ServiceStartFailed(String),

    #[error("Ingestion service at {endpoint} did not answer its health check after {attempts} attempts")]
    #[diagnostic(
        code(slink::supervisor::timeout),
        help("The service may be slow to start; raise `ingest.startup_attempts` or check its log file")
    )]
    StartupTimeout { endpoint: String, attempts: u32 },

    #[error("Process error: {0}")]
    #[diagnostic(code(slink::process::error))]
    Process(String),

    #[error("Schema error: {0}")]
    #[diagnostic(
        code(slink::database::schema),
        help("Set `database.schema` to an existing SQL file, or remove it to use the bundled schema")
    )]
    Schema(String),

    #[error("Database error: {0}")]
    #[diagnostic(code(slink::database::error))]
    Database(#[from] tokio_rusqlite::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Rusqlite(e))
    }
}

impl Error {
    /// Whether the error is the caller's fault (maps to a 4xx status).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidLink(_) | Error::Rejected { .. })
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::Config(msg) if msg.contains("Could not find") => Some(
                "Create slink.yaml in this directory or pass --config <path>".to_string(),
            ),
            Error::Config(_) | Error::Validation(_) | Error::Parse(_) => {
                Some("Inspect your configuration with: slink doctor".to_string())
            }
            Error::InvalidLink(_) => {
                Some("Provide at least a description (-d) and a URL (-u)".to_string())
            }
            Error::StartupTimeout { .. } | Error::ServiceStartFailed(_) => Some(
                "slink keeps serving and writes links directly to the database; \
                 run `slink ingest` by hand to see why the service does not come up"
                    .to_string(),
            ),
            Error::Database(e) => {
                // tokio_rusqlite wraps the underlying error opaquely, so match on text.
                let err_str = e.to_string();
                if err_str.contains("database is locked") || err_str.contains("SQLITE_BUSY") {
                    Some("Another writer holds the database; retry in a moment".to_string())
                } else if err_str.contains("FOREIGN KEY") {
                    Some("The category id does not exist; list categories on the form page".to_string())
                } else {
                    Some("Check the database path with: slink doctor --test-db".to_string())
                }
            }
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(hint) => format!("{}\n\nHint: {}", self, hint),
            None => self.to_string(),
        }
    }
}

/// Convert a child PID into a signal target.
///
/// Rejects 0 (the caller's own process group), 1 (init) and values that do
/// not fit a `pid_t`.
pub fn validate_pid(pid: u32) -> Result<nix::unistd::Pid> {
    match pid {
        0 | 1 => Err(Error::Process(format!("refusing to signal PID {}", pid))),
        p if p > i32::MAX as u32 => Err(Error::Process(format!(
            "PID {} exceeds i32::MAX, cannot convert safely",
            p
        ))),
        p => Ok(nix::unistd::Pid::from_raw(p as i32)),
    }
}
