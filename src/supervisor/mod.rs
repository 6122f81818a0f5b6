//! Search engine supervision
//!
//! The supervisor task exclusively owns the engine process and its liveness
//! tracker. The rest of the service only sees it through two channels: a stop
//! request going in, and a [`ShutdownReason`] coming out if the engine dies.

mod health;
mod process;

pub use health::{
    watch_liveness, HealthProbe, Liveness, LivenessTracker, ProbePolicy, FAILURE_THRESHOLD,
};
pub use process::{launch_args, ProcessState, SearchProcess};

use std::fmt;
use std::process::ExitStatus;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Errors from managing the search engine process
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Search engine has not been started")]
    NotStarted,

    #[error("Search engine already started")]
    AlreadyStarted,

    #[error("Wait called before stop")]
    WaitBeforeStop,

    #[error("Failed to signal search engine: {0}")]
    Signal(std::io::Error),

    #[error("Failed waiting for search engine: {0}")]
    Wait(std::io::Error),

    #[error("Supervisor task failed: {0}")]
    Task(String),
}

/// Why the service is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl-C or SIGTERM
    Signal,
    /// The liveness probe hit its failure threshold
    SearchEngineUnhealthy,
    /// No requests for the configured idle period
    Idle,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal => write!(f, "signal"),
            ShutdownReason::SearchEngineUnhealthy => write!(f, "search engine unhealthy"),
            ShutdownReason::Idle => write!(f, "idle timeout"),
        }
    }
}

/// Handle to the running supervisor task
pub struct Supervisor {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<ExitStatus, SupervisorError>>,
}

impl Supervisor {
    /// Launches the engine and starts watching it
    ///
    /// If the engine is declared dead, the task stops it, waits for it to exit
    /// and sends one [`ShutdownReason::SearchEngineUnhealthy`] on `shutdown_tx`.
    pub fn start(
        mut process: SearchProcess,
        probe: Arc<dyn HealthProbe>,
        policy: ProbePolicy,
        shutdown_tx: mpsc::Sender<ShutdownReason>,
    ) -> Result<Self, SupervisorError> {
        process.start()?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(supervise(process, probe, policy, stop_rx, shutdown_tx));

        Ok(Self {
            stop_tx: Some(stop_tx),
            task,
        })
    }

    /// Whether the supervisor task has already stopped the engine on its own
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the engine and waits for it to exit
    pub async fn shutdown(mut self) -> Result<ExitStatus, SupervisorError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The task may already be gone after an unhealthy shutdown
            let _ = stop_tx.send(());
        }

        self.task
            .await
            .map_err(|e| SupervisorError::Task(e.to_string()))?
    }
}

async fn supervise(
    mut process: SearchProcess,
    probe: Arc<dyn HealthProbe>,
    policy: ProbePolicy,
    stop_rx: oneshot::Receiver<()>,
    shutdown_tx: mpsc::Sender<ShutdownReason>,
) -> Result<ExitStatus, SupervisorError> {
    let mut tracker = LivenessTracker::default();

    // A dropped handle counts as a stop request
    let unhealthy = tokio::select! {
        _ = stop_rx => false,
        _ = watch_liveness(probe.as_ref(), &mut tracker, policy) => true,
    };

    if unhealthy {
        tracing::error!("Search engine is unhealthy, stopping it");
    } else {
        tracing::info!("Stopping search engine");
    }

    let result = stop_and_wait(&mut process).await;
    if let Err(e) = &result {
        tracing::error!("Failed to stop search engine: {}", e);
    }

    if unhealthy {
        tracing::info!("Requesting service shutdown");
        if shutdown_tx
            .send(ShutdownReason::SearchEngineUnhealthy)
            .await
            .is_err()
        {
            tracing::warn!("Shutdown channel closed, nobody to notify");
        }
    }

    result
}

async fn stop_and_wait(process: &mut SearchProcess) -> Result<ExitStatus, SupervisorError> {
    process.stop()?;
    process.wait().await
}
