// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relaunch arming and the exit-time launch of the replacement process.
//!
//! Lifecycle per process: `Running → Armed → Exited`.
//!
//! [`Relauncher::relaunch`] rebuilds the command line, stores it, runs the
//! caller's `on_exit` hook, and requests an orderly shutdown through the
//! shutdown token. The host owns an [`ExitGuard`] for the whole of `main`;
//! once its runtime has been torn down (listening sockets closed, files
//! flushed) it finishes the guard, which launches whatever was armed last.

use crate::capture::{CaptureError, HostProcess, LaunchSource};
use crate::config::Config;
use parking_lot::Mutex;
use reup_core::{
    ArtifactLookup, BuildError, CommandLineBuilder, FsLocator, LaunchDescriptor, LaunchProfile,
};
use serde::Deserialize;
use std::os::unix::process::CommandExt;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Callback run synchronously after arming, before shutdown is requested.
pub type OnExit = Arc<dyn Fn() + Send + Sync>;

/// How the armed command replaces the current process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecStrategy {
    /// Start the replacement as a new process, then exit
    #[default]
    Spawn,
    /// `exec(2)` the replacement in place of the current process image
    Replace,
}

reup_core::simple_display! {
    ExecStrategy {
        Spawn => "spawn",
        Replace => "replace",
    }
}

impl FromStr for ExecStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spawn" => Ok(Self::Spawn),
            "replace" => Ok(Self::Replace),
            other => Err(other.to_string()),
        }
    }
}

/// Relaunch lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaunchState {
    Running,
    Armed,
    Exited,
}

reup_core::simple_display! {
    RelaunchState {
        Running => "running",
        Armed => "armed",
        Exited => "exited",
    }
}

/// Relaunch errors. None of them leave a relaunch armed.
#[derive(Debug, Error)]
pub enum RelaunchError {
    #[error("cannot determine current launch parameters: {0}")]
    Capture(#[from] CaptureError),
    #[error("cannot rebuild command line: {0}")]
    Build(#[from] BuildError),
    #[error("process has already exited")]
    Exited,
}

/// What finishing the exit guard did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Nothing was armed; plain exit
    NotArmed,
    /// The replacement process was started
    Spawned { pid: u32 },
    /// The replacement could not be started
    Failed,
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

struct Slot {
    state: RelaunchState,
    armed: Option<LaunchDescriptor>,
}

struct Shared {
    slot: Mutex<Slot>,
    shutdown: CancellationToken,
}

/// Arms relaunches of the current process. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Relauncher {
    profile: Arc<LaunchProfile>,
    source: Arc<dyn LaunchSource>,
    lookup: Arc<dyn ArtifactLookup + Send + Sync>,
    exec: ExecStrategy,
    shared: Arc<Shared>,
}

impl Relauncher {
    pub fn new(
        profile: LaunchProfile,
        source: impl LaunchSource + 'static,
        lookup: impl ArtifactLookup + Send + Sync + 'static,
    ) -> Self {
        Self {
            profile: Arc::new(profile),
            source: Arc::new(source),
            lookup: Arc::new(lookup),
            exec: ExecStrategy::default(),
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot { state: RelaunchState::Running, armed: None }),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Relauncher for the host process, with filesystem artifact lookup.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.profile.clone(),
            HostProcess::new(config.profile.clone()),
            FsLocator::new(config.profile.scan),
        )
        .with_exec(config.exec)
    }

    pub fn with_exec(mut self, exec: ExecStrategy) -> Self {
        self.exec = exec;
        self
    }

    /// Arm a relaunch of the current invocation and request shutdown.
    ///
    /// With `with_update`, a packaged artifact is swapped for its newest
    /// sibling version when one can be found. Calling again before exit
    /// replaces the armed command.
    pub fn relaunch(
        &self,
        on_exit: Option<&dyn Fn()>,
        with_update: bool,
    ) -> Result<(), RelaunchError> {
        if self.state() == RelaunchState::Exited {
            return Err(RelaunchError::Exited);
        }

        let descriptor = match self.prepare(with_update) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::error!(error = %e, "relaunch aborted; process keeps running");
                return Err(e);
            }
        };

        {
            let mut slot = self.shared.slot.lock();
            // The guard may have fired while the command line was being built
            if slot.state == RelaunchState::Exited {
                tracing::warn!(command = %descriptor, "process exited before relaunch was armed");
                return Err(RelaunchError::Exited);
            }
            if slot.armed.is_some() {
                tracing::debug!("replacing previously armed relaunch");
            }
            tracing::info!(
                command = %descriptor,
                mode = %descriptor.mode,
                update = with_update,
                "relaunch armed"
            );
            slot.armed = Some(descriptor);
            slot.state = RelaunchState::Armed;
        }

        if let Some(on_exit) = on_exit {
            on_exit();
        }
        self.shared.shutdown.cancel();
        Ok(())
    }

    fn prepare(&self, with_update: bool) -> Result<LaunchDescriptor, RelaunchError> {
        let request = self.source.capture()?.into_request(with_update);
        let builder = CommandLineBuilder::new(&self.profile, &*self.lookup);
        Ok(builder.build(&request)?)
    }

    /// Cancelled once a relaunch is armed; the host should shut down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shared.shutdown.clone()
    }

    pub fn state(&self) -> RelaunchState {
        self.shared.slot.lock().state
    }

    /// The command that will run at exit, if any.
    pub fn armed(&self) -> Option<LaunchDescriptor> {
        self.shared.slot.lock().armed.clone()
    }

    /// Scoped finalizer that launches the armed command.
    pub fn exit_guard(&self) -> ExitGuard {
        ExitGuard { shared: Arc::clone(&self.shared), exec: self.exec, fired: false }
    }
}

/// Launches the armed relaunch when finished or dropped.
///
/// Hold it for the life of `main` and finish it after the host has released
/// its resources.
#[must_use = "dropping the guard immediately launches any armed relaunch"]
pub struct ExitGuard {
    shared: Arc<Shared>,
    exec: ExecStrategy,
    fired: bool,
}

impl ExitGuard {
    /// Launch the armed command, if any. With [`ExecStrategy::Replace`] a
    /// successful launch does not return.
    pub fn finish(mut self) -> ExitOutcome {
        self.fire()
    }

    fn fire(&mut self) -> ExitOutcome {
        if self.fired {
            return ExitOutcome::NotArmed;
        }
        self.fired = true;

        let armed = {
            let mut slot = self.shared.slot.lock();
            slot.state = RelaunchState::Exited;
            slot.armed.take()
        };
        match armed {
            Some(descriptor) => launch(&descriptor, self.exec),
            None => ExitOutcome::NotArmed,
        }
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.fire();
    }
}

fn launch(descriptor: &LaunchDescriptor, exec: ExecStrategy) -> ExitOutcome {
    let mut cmd = descriptor.to_command();
    match exec {
        ExecStrategy::Spawn => match cmd.spawn() {
            Ok(child) => {
                tracing::info!(
                    pid = child.id(),
                    command = %descriptor,
                    "replacement process started"
                );
                ExitOutcome::Spawned { pid: child.id() }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    command = %descriptor,
                    "failed to start replacement process"
                );
                ExitOutcome::Failed
            }
        },
        ExecStrategy::Replace => {
            tracing::info!(command = %descriptor, "replacing process image");
            let e = cmd.exec();
            tracing::error!(error = %e, command = %descriptor, "failed to exec replacement");
            ExitOutcome::Failed
        }
    }
}

#[cfg(test)]
#[path = "relaunch_tests.rs"]
mod tests;
