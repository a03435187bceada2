use super::Launcher;
use crate::config::IngestConfig;
use crate::endpoint::ServiceEndpoint;
use crate::error::{validate_pid, Error, Result};
use crate::healthcheck::{HealthChecker, HttpProbe};
use nix::sys::signal::{self, killpg, Signal};
use std::path::Path;
use std::time::Duration;
use tokio::process::Child;

/// Synchronous mutex for fields that are never held across await points.
type SyncMutex<T> = parking_lot::Mutex<T>;

/// Poll step used while waiting for a terminated child outside the runtime.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a successful [`ProcessSupervisor::start`] came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Something already answered on the endpoint; nothing was spawned.
    External,
    /// This supervisor already owns a live child.
    AlreadyOwned { pid: u32 },
    /// A child was spawned and became healthy.
    Spawned { pid: u32 },
}

/// Owns the lifecycle of the ingestion service process.
///
/// # Mutex Type Selection
///
/// - **`tokio::sync::Mutex`** around the child handle: `start` holds it for
///   the whole startup wait and `stop` across `wait()`, so concurrent callers
///   queue instead of spawning twice.
/// - **`parking_lot::Mutex`** for the PID: read synchronously by `pid()` and
///   by the drop hook.
///
/// Liveness is never cached. [`ProcessSupervisor::is_running`] probes the
/// endpoint on every call.
pub struct ProcessSupervisor {
    endpoint: ServiceEndpoint,
    launcher: Launcher,
    /// Probe used while handling requests.
    probe: HttpProbe,
    /// Probe used during the startup wait, bounded by the poll interval.
    startup_probe: HttpProbe,
    startup_attempts: u32,
    startup_interval: Duration,
    grace_period: Duration,
    child: tokio::sync::Mutex<Option<Child>>,
    pid: SyncMutex<Option<u32>>,
}

impl ProcessSupervisor {
    pub fn new(endpoint: ServiceEndpoint, config: &IngestConfig, launcher: Launcher) -> Self {
        let probe = HttpProbe::new(&endpoint, config.probe_timeout);
        let startup_probe = probe.with_timeout(config.probe_timeout.min(config.startup_interval));

        Self {
            endpoint,
            launcher,
            probe,
            startup_probe,
            startup_attempts: config.startup_attempts.max(1),
            startup_interval: config.startup_interval,
            grace_period: config.grace_period,
            child: tokio::sync::Mutex::new(None),
            pid: SyncMutex::new(None),
        }
    }

    /// Supervisor for the `ingest` section, relaunching this executable.
    pub fn from_config(config: &IngestConfig, config_path: Option<&Path>) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let launcher = Launcher::current_exe(config_path, config)?;
        Ok(Self::new(endpoint, config, launcher))
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// PID of the owned child, if any.
    pub fn pid(&self) -> Option<u32> {
        *self.pid.lock()
    }

    /// Bring the ingestion service up, or adopt one that is already answering.
    ///
    /// Blocks the caller for at most `startup_attempts * startup_interval`
    /// (plus probe latency). On any failure the spawned child is terminated
    /// before the error is returned.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn start(&self) -> Result<StartOutcome> {
        let mut slot = self.child.lock().await;

        if let Some(child) = slot.as_mut() {
            match child.try_wait() {
                Ok(None) => {
                    let pid = child.id().unwrap_or_default();
                    tracing::debug!("Ingestion service already owned (pid {})", pid);
                    return Ok(StartOutcome::AlreadyOwned { pid });
                }
                Ok(Some(status)) => {
                    tracing::warn!("Previously spawned ingestion service exited ({})", status);
                }
                Err(e) => {
                    tracing::warn!("Could not query previously spawned service: {}", e);
                }
            }
            *slot = None;
            *self.pid.lock() = None;
        }

        if self.probe.check().await {
            tracing::info!(
                "Ingestion service already running at {}, not spawning",
                self.endpoint
            );
            return Ok(StartOutcome::External);
        }

        tracing::info!("Starting ingestion service: {}", self.launcher);
        let child = self.launcher.command().spawn().map_err(|e| {
            Error::ServiceStartFailed(format!(
                "could not launch '{}': {}",
                self.launcher.program().display(),
                e
            ))
        })?;
        let pid = child.id().unwrap_or_default();
        *self.pid.lock() = Some(pid);
        *slot = Some(child);

        for attempt in 1..=self.startup_attempts {
            let exited = slot
                .as_mut()
                .and_then(|child| child.try_wait().ok().flatten());
            if let Some(status) = exited {
                *slot = None;
                *self.pid.lock() = None;
                return Err(Error::ServiceStartFailed(format!(
                    "process {} exited during startup ({})",
                    pid, status
                )));
            }

            if self.startup_probe.check().await {
                tracing::info!(
                    "Ingestion service healthy at {} after {} attempt(s) (pid {})",
                    self.endpoint,
                    attempt,
                    pid
                );
                return Ok(StartOutcome::Spawned { pid });
            }

            tracing::debug!(
                "Waiting for ingestion service ({}/{})",
                attempt,
                self.startup_attempts
            );
            if attempt < self.startup_attempts {
                tokio::time::sleep(self.startup_interval).await;
            }
        }

        tracing::warn!(
            "Ingestion service did not become healthy, terminating pid {}",
            pid
        );
        if let Some(child) = slot.take() {
            self.terminate(child).await;
        }
        *self.pid.lock() = None;

        Err(Error::StartupTimeout {
            endpoint: self.endpoint.to_string(),
            attempts: self.startup_attempts,
        })
    }

    /// Terminate the owned child: SIGTERM, up to `grace_period`, then SIGKILL.
    ///
    /// Does nothing when this supervisor did not spawn the running service.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn stop(&self) -> Result<()> {
        let child = self.child.lock().await.take();
        *self.pid.lock() = None;

        match child {
            Some(child) => {
                self.terminate(child).await;
                Ok(())
            }
            None => {
                tracing::debug!("No owned ingestion service to stop");
                Ok(())
            }
        }
    }

    /// Fresh liveness probe against the endpoint.
    pub async fn is_running(&self) -> bool {
        self.probe.check().await
    }

    async fn terminate(&self, mut child: Child) {
        let Some(raw_pid) = child.id() else {
            // already reaped
            let _ = child.wait().await;
            return;
        };
        let pid = match validate_pid(raw_pid) {
            Ok(pid) => pid,
            Err(e) => {
                tracing::error!("{}", e);
                let _ = child.start_kill();
                return;
            }
        };

        let signal_result =
            killpg(pid, Signal::SIGTERM).or_else(|_| signal::kill(pid, Signal::SIGTERM));
        if let Err(e) = signal_result {
            tracing::warn!("Failed to send SIGTERM to {}: {}", raw_pid, e);
        }

        match tokio::time::timeout(self.grace_period, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!("Ingestion service {} exited ({})", raw_pid, status);
            }
            Ok(Err(e)) => {
                tracing::warn!("Error waiting for ingestion service {}: {}", raw_pid, e);
                let _ = killpg(pid, Signal::SIGKILL)
                    .or_else(|_| signal::kill(pid, Signal::SIGKILL));
                let _ = tokio::time::timeout(Duration::from_secs(2), child.wait()).await;
            }
            Err(_) => {
                tracing::warn!(
                    "Ingestion service {} did not exit after SIGTERM (grace period: {:?}), sending SIGKILL",
                    raw_pid,
                    self.grace_period
                );
                let _ = killpg(pid, Signal::SIGKILL)
                    .or_else(|_| signal::kill(pid, Signal::SIGKILL));
                let _ = tokio::time::timeout(Duration::from_secs(2), child.wait()).await;
            }
        }
    }
}

impl Drop for ProcessSupervisor {
    /// Exit hook: the same SIGTERM / grace / SIGKILL sequence as `stop`,
    /// polled synchronously since no runtime is guaranteed here.
    fn drop(&mut self) {
        let Some(mut child) = self.child.get_mut().take() else {
            return;
        };
        let Some(raw_pid) = child.id() else {
            return;
        };
        let Ok(pid) = validate_pid(raw_pid) else {
            let _ = child.start_kill();
            return;
        };

        tracing::info!("Stopping ingestion service {} on shutdown", raw_pid);
        if killpg(pid, Signal::SIGTERM)
            .or_else(|_| signal::kill(pid, Signal::SIGTERM))
            .is_ok()
        {
            let polls = (self.grace_period.as_millis() / EXIT_POLL_INTERVAL.as_millis()).max(1);
            for _ in 0..polls {
                if matches!(child.try_wait(), Ok(Some(_))) {
                    return;
                }
                std::thread::sleep(EXIT_POLL_INTERVAL);
            }
        }

        tracing::warn!("Ingestion service {} still running, sending SIGKILL", raw_pid);
        let _ = killpg(pid, Signal::SIGKILL).or_else(|_| signal::kill(pid, Signal::SIGKILL));
        let _ = child.try_wait();
    }
}
