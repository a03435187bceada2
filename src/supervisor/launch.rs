use crate::config::IngestConfig;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// How the supervised ingestion service is started.
///
/// The default launcher re-executes the running binary with the `ingest`
/// subcommand so both processes always agree on configuration and version.
#[derive(Debug, Clone)]
pub struct Launcher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl Launcher {
    /// Arbitrary program and arguments.
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `<current exe> [--config <path>] --log file --log-file <file> ingest --host <host> --port <port>`
    pub fn current_exe(config_path: Option<&Path>, ingest: &IngestConfig) -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| {
            Error::ServiceStartFailed(format!("cannot locate the running executable: {}", e))
        })?;
        Ok(Self::for_program(exe, config_path, ingest))
    }

    /// Same argument contract as [`Launcher::current_exe`] for another binary.
    pub fn for_program(
        program: impl Into<PathBuf>,
        config_path: Option<&Path>,
        ingest: &IngestConfig,
    ) -> Self {
        let mut args: Vec<OsString> = Vec::new();
        if let Some(path) = config_path {
            // The child may resolve relative paths differently once detached
            let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            args.push("--config".into());
            args.push(path.into_os_string());
        }
        args.push("--log".into());
        args.push("file".into());
        args.push("--log-file".into());
        args.push(ingest.log_file.clone().into_os_string());
        args.push("ingest".into());
        args.push("--host".into());
        args.push(ingest.host.clone().into());
        args.push("--port".into());
        args.push(ingest.port.to_string().into());

        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Command with every stdio stream detached, in its own process group.
    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            // own process group so terminal signals to the parent do not reach it
            .process_group(0);
        cmd
    }
}

impl std::fmt::Display for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
