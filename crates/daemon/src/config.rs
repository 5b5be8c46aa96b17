// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration, loaded from TOML.
//!
//! ```toml
//! exec = "spawn"
//!
//! [profile]
//! artifact_extensions = ["jar", "war"]
//!
//! [[signals]]
//! name = "SIGUSR2"
//! update = true
//! ```

use crate::env;
use crate::relaunch::ExecStrategy;
use reup_core::LaunchProfile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid REUP_EXEC value '{0}' (expected 'spawn' or 'replace')")]
    ExecStrategy(String),
}

/// A signal that triggers a relaunch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignalBinding {
    /// Signal name, e.g. `SIGUSR2` or `USR2`
    pub name: String,
    /// Substitute the newest artifact on relaunch
    #[serde(default)]
    pub update: bool,
}

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profile: LaunchProfile,
    pub exec: ExecStrategy,
    pub signals: Vec<SignalBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: LaunchProfile::default(),
            exec: ExecStrategy::default(),
            signals: vec![
                SignalBinding { name: "SIGUSR2".to_string(), update: true },
                SignalBinding { name: "SIGHUP".to_string(), update: false },
            ],
        }
    }
}

impl Config {
    /// Load configuration: REUP_CONFIG > default config path > built-in defaults.
    ///
    /// An explicit `REUP_CONFIG` must exist; the default path may be absent.
    /// `REUP_EXEC` overrides the file's exec strategy.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::config_override() {
            Some(path) => Self::from_file(&path)?,
            None => match env::default_config_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        if let Some(raw) = env::exec_strategy() {
            config.exec = raw.parse().map_err(|_| ConfigError::ExecStrategy(raw))?;
        }
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
