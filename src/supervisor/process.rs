//! Search engine subprocess
//!
//! The engine runs in its own process group so an interrupt reaches every
//! process it forks, not only the direct child. Lifecycle:
//!
//! ```text
//! NotStarted -> Running -> StopRequested -> Exited
//!                  \______________________/
//!                     (unexpected exit)
//! ```

use crate::config::SearchConfig;
use crate::supervisor::SupervisorError;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// Lifecycle state of the search engine process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotStarted,
    Running,
    StopRequested,
    Exited,
}

/// Builds the engine's command-line arguments
///
/// A configured API key switches the engine to production mode, where the key
/// becomes its master key.
pub fn launch_args(config: &SearchConfig) -> Vec<String> {
    let mut args = vec![
        "--db-path".to_string(),
        config.data_path.clone(),
        "--http-addr".to_string(),
        config.http_addr.clone(),
    ];

    if config.is_production() {
        args.push("--env=production".to_string());
        args.push("--master-key".to_string());
        args.push(config.api_key.clone());
    } else {
        args.push("--env=development".to_string());
    }

    args
}

/// Handle to the search engine child process
#[derive(Debug)]
pub struct SearchProcess {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    state: ProcessState,
    exit_status: Option<ExitStatus>,
}

impl SearchProcess {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            child: None,
            state: ProcessState::NotStarted,
            exit_status: None,
        }
    }

    /// Creates the process described by the search configuration
    pub fn from_config(config: &SearchConfig) -> Self {
        if config.is_production() {
            tracing::info!("Using production env for search");
        } else {
            tracing::info!("Using development env for search");
        }
        Self::new(&config.binary, launch_args(config))
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Command line for display, with the master key masked
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                parts.push("********".to_string());
                mask_next = false;
            } else {
                mask_next = arg == "--master-key";
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }

    /// Launches the process in a new process group
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        if self.state != ProcessState::NotStarted {
            return Err(SupervisorError::AlreadyStarted);
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| SupervisorError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        tracing::info!(
            "Started search engine '{}' (pid {:?})",
            self.program,
            child.id()
        );

        self.child = Some(child);
        self.state = ProcessState::Running;
        Ok(())
    }

    /// Sends an interrupt to the whole process group
    ///
    /// The engine gets the chance to shut down gracefully; use [`wait`] to
    /// observe its exit. Stopping a process that already exited is a no-op.
    ///
    /// [`wait`]: SearchProcess::wait
    pub fn stop(&mut self) -> Result<(), SupervisorError> {
        match self.state {
            ProcessState::NotStarted => return Err(SupervisorError::NotStarted),
            ProcessState::StopRequested | ProcessState::Exited => return Ok(()),
            ProcessState::Running => {}
        }

        if self.reap_if_exited()? {
            tracing::warn!("Search engine had already exited: {:?}", self.exit_status);
            return Ok(());
        }

        let child = self.child.as_mut().ok_or(SupervisorError::NotStarted)?;
        interrupt(child)?;
        self.state = ProcessState::StopRequested;
        tracing::info!("Sent interrupt to search engine");
        Ok(())
    }

    /// Waits for the process to exit
    ///
    /// Must be preceded by [`stop`](SearchProcess::stop) unless the process
    /// has already died on its own.
    pub async fn wait(&mut self) -> Result<ExitStatus, SupervisorError> {
        match self.state {
            ProcessState::NotStarted => return Err(SupervisorError::NotStarted),
            ProcessState::Running => {
                if !self.reap_if_exited()? {
                    return Err(SupervisorError::WaitBeforeStop);
                }
            }
            ProcessState::StopRequested => {
                let child = self.child.as_mut().ok_or(SupervisorError::NotStarted)?;
                let status = child.wait().await.map_err(SupervisorError::Wait)?;
                self.exit_status = Some(status);
                self.state = ProcessState::Exited;
                tracing::info!("Search engine exited: {}", status);
            }
            ProcessState::Exited => {}
        }

        self.exit_status.ok_or(SupervisorError::NotStarted)
    }

    /// Moves to `Exited` if the child is already gone
    fn reap_if_exited(&mut self) -> Result<bool, SupervisorError> {
        let child = match self.child.as_mut() {
            Some(child) => child,
            None => return Ok(false),
        };

        match child.try_wait().map_err(SupervisorError::Wait)? {
            Some(status) => {
                self.exit_status = Some(status);
                self.state = ProcessState::Exited;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(unix)]
fn interrupt(child: &mut Child) -> Result<(), SupervisorError> {
    let pid = match child.id() {
        Some(pid) => pid,
        None => return Ok(()),
    };

    // The child leads its own group, so its pid is the group id.
    let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGINT) };
    if rc == 0 {
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        tracing::debug!("Process group {} already gone", pid);
        return Ok(());
    }
    Err(SupervisorError::Signal(err))
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child) -> Result<(), SupervisorError> {
    child.start_kill().map_err(SupervisorError::Signal)
}
