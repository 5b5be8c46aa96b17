// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reup daemon library
//!
//! Captures the running process's invocation, arms a relaunch of it, and
//! launches the replacement once the host has released its resources.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod capture;
pub mod config;
pub mod env;
pub mod logging;
pub mod relaunch;
pub mod signal;

pub use capture::{
    parse_invocation, CaptureError, CapturedLaunch, HostProcess, LaunchSource, StaticSource,
};
pub use config::{Config, ConfigError, SignalBinding};
pub use relaunch::{
    ExecStrategy, ExitGuard, ExitOutcome, OnExit, RelaunchError, RelaunchState, Relauncher,
};
pub use signal::{on_signal, parse_signal, SignalError};
