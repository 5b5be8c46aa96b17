// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reupd: reference host that relaunches itself on signal.
//!
//! ```text
//! reupd [runtime flags] (-jar <artifact> | -cp <deps> <entry>) [args]
//! ```
//!
//! Program argument `--record <file>` appends `<pid> <target>` to `<file>`
//! once signal handlers are installed.

use anyhow::{Context, Result};
use reup_daemon::{
    env, logging, on_signal, CapturedLaunch, Config, HostProcess, LaunchSource, Relauncher,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

const USAGE: &str = "usage: reupd [runtime flags] (-jar <artifact> | -cp <deps> <entry>) [args]";

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("reupd: {e}");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = logging::init(env::log_dir().as_deref()) {
        eprintln!("reupd: {e}");
    }

    let launch = match HostProcess::new(config.profile.clone()).capture() {
        Ok(launch) => launch,
        Err(e) => {
            eprintln!("reupd: {e}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let relauncher = Relauncher::from_config(&config);
    let guard = relauncher.exit_guard();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")
        .and_then(|runtime| {
            let result = runtime.block_on(serve(&config, &relauncher, &launch));
            // Dropping the runtime closes everything it owns before the guard fires
            drop(runtime);
            result
        });

    if let Err(e) = result {
        error!("reupd failed: {e:#}");
        eprintln!("reupd: {e:#}");
        return ExitCode::FAILURE;
    }
    guard.finish().exit_code()
}

async fn serve(config: &Config, relauncher: &Relauncher, launch: &CapturedLaunch) -> Result<()> {
    for binding in &config.signals {
        on_signal(relauncher, &binding.name, None, binding.update)
            .with_context(|| format!("cannot bind relaunch signal {}", binding.name))?;
    }
    let mut terminate = signal(SignalKind::terminate()).context("cannot bind SIGTERM")?;

    info!(
        pid = std::process::id(),
        target = launch.target(),
        flags = ?launch.runtime_flags,
        args = ?launch.program_args(),
        "serving"
    );
    if let Some(path) = record_path(launch.program_args()) {
        record(&path, launch.target())?;
    }

    let shutdown = relauncher.shutdown_token();
    tokio::select! {
        _ = shutdown.cancelled() => info!("relaunch armed, shutting down"),
        _ = terminate.recv() => info!("SIGTERM received, shutting down"),
        _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
    }
    Ok(())
}

fn record_path(args: &[String]) -> Option<PathBuf> {
    args.iter().position(|arg| arg == "--record").and_then(|i| args.get(i + 1)).map(PathBuf::from)
}

fn record(path: &Path, target: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open record file {}", path.display()))?;
    writeln!(file, "{} {}", std::process::id(), target)?;
    Ok(())
}
