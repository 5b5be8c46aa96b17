// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal-triggered relaunch.

use crate::relaunch::{OnExit, Relauncher};
use nix::sys::signal::Signal;
use std::str::FromStr;
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

/// Signal registration errors
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("unknown signal '{0}'")]
    Unknown(String),
    #[error("signal {0} cannot be handled")]
    Forbidden(&'static str),
    #[error("cannot register handler for {signal}: {source}")]
    Register {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve a signal name. Accepts `SIGUSR2`, `USR2`, `usr2`.
pub fn parse_signal(name: &str) -> Result<Signal, SignalError> {
    let upper = name.trim().to_ascii_uppercase();
    let full = if upper.starts_with("SIG") { upper } else { format!("SIG{upper}") };
    let signal = Signal::from_str(&full).map_err(|_| SignalError::Unknown(name.to_string()))?;
    // Uncatchable, or synchronous faults a handler must not swallow
    if matches!(
        signal,
        Signal::SIGKILL | Signal::SIGSTOP | Signal::SIGILL | Signal::SIGFPE | Signal::SIGSEGV
    ) {
        return Err(SignalError::Forbidden(signal.as_str()));
    }
    Ok(signal)
}

/// Relaunch the process each time the named signal arrives.
///
/// Every delivery attempts its own relaunch on the blocking pool; a failed
/// attempt is logged and the process keeps running. Must be called from
/// within a tokio runtime.
pub fn on_signal(
    relauncher: &Relauncher,
    name: &str,
    on_exit: Option<OnExit>,
    with_update: bool,
) -> Result<JoinHandle<()>, SignalError> {
    let signal_id = parse_signal(name)?;
    let mut stream = signal(SignalKind::from_raw(signal_id as i32))
        .map_err(|source| SignalError::Register { signal: signal_id.as_str(), source })?;
    tracing::info!(
        signal = signal_id.as_str(),
        update = with_update,
        "relaunch signal handler installed"
    );

    let relauncher = relauncher.clone();
    Ok(tokio::spawn(async move {
        while stream.recv().await.is_some() {
            tracing::info!(signal = signal_id.as_str(), "relaunch requested by signal");
            // Capture and the artifact scan do blocking filesystem I/O
            let relauncher = relauncher.clone();
            let on_exit = on_exit.clone();
            let attempt = tokio::task::spawn_blocking(move || {
                let hook = on_exit.as_deref().map(|f| f as &dyn Fn());
                relauncher.relaunch(hook, with_update)
            });
            match attempt.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(signal = signal_id.as_str(), error = %e, "signal relaunch failed")
                }
                Err(e) => {
                    tracing::error!(signal = signal_id.as_str(), error = %e, "relaunch task failed")
                }
            }
        }
    }))
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
