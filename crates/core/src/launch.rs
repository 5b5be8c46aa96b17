// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relaunch command-line construction.
//!
//! The resulting argument vector is always laid out as:
//!
//! ```text
//! <executable> <runtime flags…> <marker> [<dependency path>] <target> <program args…>
//! ```

use crate::profile::LaunchProfile;
use crate::scan::ArtifactLookup;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Errors from building a launch descriptor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("original command has no artifact or entry point")]
    EmptyCommand,
}

/// Everything captured about the running invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaunchRequest {
    /// The runtime's own executable
    pub executable: PathBuf,
    /// Runtime flags in original order
    pub runtime_flags: Vec<String>,
    /// Artifact path or entry point, followed by program arguments
    pub command_args: Vec<String>,
    /// Dependency path captured in entry-point mode
    pub dependency_path: Option<String>,
    /// Substitute the newest sibling artifact
    pub with_update: bool,
}

/// How the target is handed to the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Run a packaged artifact directly
    Artifact,
    /// Run a named entry point from an explicit dependency path
    Classpath,
}

crate::simple_display! {
    LaunchMode {
        Artifact => "artifact",
        Classpath => "classpath",
    }
}

/// A reconstructed invocation, ready to hand to the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchDescriptor {
    pub executable: PathBuf,
    pub runtime_flags: Vec<String>,
    pub mode: LaunchMode,
    pub marker: String,
    /// Present in classpath mode only
    pub dependency_path: Option<String>,
    /// Artifact path (artifact mode) or entry point (classpath mode)
    pub target: String,
    pub program_args: Vec<String>,
}

impl LaunchDescriptor {
    /// Arguments after the executable, in launch order.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.len() - 1);
        args.extend(self.runtime_flags.iter().cloned());
        args.push(self.marker.clone());
        args.extend(self.dependency_path.iter().cloned());
        args.push(self.target.clone());
        args.extend(self.program_args.iter().cloned());
        args
    }

    /// The full argument vector, executable first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.executable.to_string_lossy().into_owned()];
        argv.extend(self.args());
        argv
    }

    /// Number of elements in [`argv`](Self::argv).
    pub fn len(&self) -> usize {
        1 + self.runtime_flags.len()
            + 1
            + usize::from(self.dependency_path.is_some())
            + 1
            + self.program_args.len()
    }

    /// Always false: a descriptor holds at least executable, marker, target.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// A `Command` that runs this invocation.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(self.args());
        cmd
    }
}

impl fmt::Display for LaunchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Builds launch descriptors from captured invocations.
pub struct CommandLineBuilder<'a, L: ?Sized> {
    profile: &'a LaunchProfile,
    lookup: &'a L,
}

impl<'a, L: ArtifactLookup + ?Sized> CommandLineBuilder<'a, L> {
    pub fn new(profile: &'a LaunchProfile, lookup: &'a L) -> Self {
        Self { profile, lookup }
    }

    /// Rebuild the invocation described by `request`.
    ///
    /// The only side effect is the artifact lookup, performed when
    /// `with_update` is set and the target is a packaged artifact. A failed
    /// lookup keeps the original artifact.
    pub fn build(&self, request: &RelaunchRequest) -> Result<LaunchDescriptor, BuildError> {
        let (first, rest) = request.command_args.split_first().ok_or(BuildError::EmptyCommand)?;

        let runtime_flags = request
            .runtime_flags
            .iter()
            .filter(|flag| {
                let excluded = self.profile.is_excluded_flag(flag);
                if excluded {
                    tracing::debug!(flag = %flag, "dropping instrumentation flag from relaunch");
                }
                !excluded
            })
            .cloned()
            .collect();

        let descriptor = if self.profile.is_artifact(first) {
            let target =
                if request.with_update { self.newest_or_current(first) } else { first.clone() };
            LaunchDescriptor {
                executable: request.executable.clone(),
                runtime_flags,
                mode: LaunchMode::Artifact,
                marker: self.profile.artifact_marker.clone(),
                dependency_path: None,
                target,
                program_args: rest.to_vec(),
            }
        } else {
            let dependency_path = request
                .dependency_path
                .clone()
                .unwrap_or_else(|| self.profile.default_dependency_path.clone());
            LaunchDescriptor {
                executable: request.executable.clone(),
                runtime_flags,
                mode: LaunchMode::Classpath,
                marker: self.profile.classpath_marker.clone(),
                dependency_path: Some(dependency_path),
                target: first.clone(),
                program_args: rest.to_vec(),
            }
        };
        Ok(descriptor)
    }

    fn newest_or_current(&self, artifact: &str) -> String {
        let newest = match self.lookup.newest_version(Path::new(artifact)) {
            Ok(newest) => newest,
            Err(e) => {
                tracing::warn!(artifact, error = %e, "artifact lookup failed; relaunching current artifact");
                return artifact.to_string();
            }
        };
        match newest.into_os_string().into_string() {
            Ok(newest) => {
                if newest != artifact {
                    tracing::info!(from = artifact, to = %newest, "updating artifact on relaunch");
                }
                newest
            }
            Err(raw) => {
                tracing::warn!(
                    artifact,
                    newest = %Path::new(&raw).display(),
                    "newest artifact path is not valid UTF-8; relaunching current artifact"
                );
                artifact.to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
