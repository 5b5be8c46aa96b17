// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Explicit config file path from `REUP_CONFIG`.
pub fn config_override() -> Option<PathBuf> {
    std::env::var_os("REUP_CONFIG").filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Default config file: `<config dir>/reup/reup.toml` (e.g. ~/.config/reup/reup.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reup").join("reup.toml"))
}

/// Log directory. When set, `reupd` logs to `<dir>/reupd.log` instead of stderr.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var_os("REUP_LOG_DIR").filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Exec strategy override (`spawn` or `replace`), unparsed.
pub fn exec_strategy() -> Option<String> {
    std::env::var("REUP_EXEC").ok().filter(|s| !s.is_empty())
}
