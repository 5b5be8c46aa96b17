// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup for `reupd`.

use std::path::Path;
use thiserror::Error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// File name of the daemon log inside the log directory
pub const LOG_FILE: &str = "reupd.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file in {dir}: {source}")]
    Appender {
        dir: String,
        #[source]
        source: tracing_appender::rolling::InitError,
    },
    #[error("global subscriber already installed")]
    AlreadyInstalled,
}

/// Install the global subscriber.
///
/// Filter comes from `RUST_LOG` (default `info`). Output goes to
/// `<log_dir>/reupd.log` when a directory is given, otherwise stderr. The file
/// writer is unbuffered so nothing is lost when the process image is replaced.
pub fn init(log_dir: Option<&Path>) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, ansi) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(LOG_FILE)
                .build(dir)
                .map_err(|source| LoggingError::Appender {
                    dir: dir.display().to_string(),
                    source,
                })?;
            (BoxMakeWriter::new(appender), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)?;

    // Startup marker, so successive generations are easy to find in a shared log
    tracing::info!("--- reupd: starting (pid: {}) ---", std::process::id());
    Ok(())
}
