// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Introspection of the running process's own invocation.

use reup_core::{LaunchProfile, RelaunchRequest};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from capturing the current invocation
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot determine current executable: {0}")]
    Executable(#[source] std::io::Error),
    #[error("argument {index} is not valid UTF-8")]
    NonUtf8 { index: usize },
    #[error("invocation names no artifact or entry point")]
    MissingTarget,
    #[error("launch marker '{0}' is missing its value")]
    MissingValue(String),
}

/// The invocation of the running process, split into its launch parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLaunch {
    pub executable: PathBuf,
    pub runtime_flags: Vec<String>,
    /// Artifact path or entry point, then program arguments. Never empty.
    pub command_args: Vec<String>,
    /// Dependency path given with the classpath marker
    pub dependency_path: Option<String>,
}

impl CapturedLaunch {
    /// The artifact path or entry point.
    pub fn target(&self) -> &str {
        self.command_args.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments following the target.
    pub fn program_args(&self) -> &[String] {
        self.command_args.get(1..).unwrap_or_default()
    }

    pub fn into_request(self, with_update: bool) -> RelaunchRequest {
        RelaunchRequest {
            executable: self.executable,
            runtime_flags: self.runtime_flags,
            command_args: self.command_args,
            dependency_path: self.dependency_path,
            with_update,
        }
    }
}

/// Where the current invocation comes from.
pub trait LaunchSource: Send + Sync {
    fn capture(&self) -> Result<CapturedLaunch, CaptureError>;
}

/// The real process: `current_exe` plus `argv`, parsed with a profile.
#[derive(Debug, Clone)]
pub struct HostProcess {
    profile: LaunchProfile,
}

impl HostProcess {
    pub fn new(profile: LaunchProfile) -> Self {
        Self { profile }
    }
}

impl LaunchSource for HostProcess {
    fn capture(&self) -> Result<CapturedLaunch, CaptureError> {
        let executable = std::env::current_exe().map_err(CaptureError::Executable)?;
        let args = std::env::args_os()
            .enumerate()
            .skip(1)
            .map(|(index, arg)| arg.into_string().map_err(|_| CaptureError::NonUtf8 { index }))
            .collect::<Result<Vec<_>, _>>()?;
        parse_invocation(&self.profile, executable, &args)
    }
}

/// A fixed invocation, for embedding hosts that know their own launch line.
#[derive(Debug, Clone)]
pub struct StaticSource(pub CapturedLaunch);

impl LaunchSource for StaticSource {
    fn capture(&self) -> Result<CapturedLaunch, CaptureError> {
        Ok(self.0.clone())
    }
}

/// Split `args` (without argv[0]) into runtime flags, launch mode, and command.
///
/// Accepted shapes:
/// - `[flags…] <artifact marker> <artifact> [args…]`
/// - `[flags…] <classpath marker> <deps> <entry> [args…]`
/// - `[flags…] <entry or artifact> [args…]`
pub fn parse_invocation(
    profile: &LaunchProfile,
    executable: PathBuf,
    args: &[String],
) -> Result<CapturedLaunch, CaptureError> {
    let split = args
        .iter()
        .position(|arg| !arg.starts_with('-') || profile.is_marker(arg))
        .ok_or(CaptureError::MissingTarget)?;
    let (flags, rest) = args.split_at(split);

    let (command_args, dependency_path) = match rest.split_first() {
        Some((marker, tail)) if *marker == profile.artifact_marker => {
            let artifact = tail.first().ok_or_else(|| CaptureError::MissingValue(marker.clone()))?;
            if !profile.is_artifact(artifact) {
                tracing::warn!(
                    artifact = %artifact,
                    "artifact has no recognized extension; relaunch will treat it as an entry point"
                );
            }
            (tail.to_vec(), None)
        }
        Some((marker, tail)) if *marker == profile.classpath_marker => {
            let (deps, command) =
                tail.split_first().ok_or_else(|| CaptureError::MissingValue(marker.clone()))?;
            if command.is_empty() {
                return Err(CaptureError::MissingTarget);
            }
            (command.to_vec(), Some(deps.clone()))
        }
        Some(_) => (rest.to_vec(), None),
        None => return Err(CaptureError::MissingTarget),
    };

    Ok(CapturedLaunch {
        executable,
        runtime_flags: flags.to_vec(),
        command_args,
        dependency_path,
    })
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
