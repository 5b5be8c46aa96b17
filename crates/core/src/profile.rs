// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch profile: how a runtime invocation is shaped.

use crate::scan::ScanOptions;
use serde::Deserialize;
use std::path::Path;

/// Recognized launch-mode markers and flag/extension rules.
///
/// Defaults describe a JVM-style runtime:
/// `runtime [flags] -jar app.jar [args]` or `runtime [flags] -cp deps Main [args]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LaunchProfile {
    /// Marker preceding a packaged artifact (`-jar`)
    pub artifact_marker: String,
    /// Marker preceding the dependency path in entry-point mode (`-cp`)
    pub classpath_marker: String,
    /// Runtime flags starting with any of these are dropped on relaunch.
    /// Instrumentation agents bind ports the exiting process still holds.
    pub excluded_flag_prefixes: Vec<String>,
    /// File extensions (without the dot) that identify a packaged artifact
    pub artifact_extensions: Vec<String>,
    /// Dependency path used in entry-point mode when none was captured
    pub default_dependency_path: String,
    /// How the newest-artifact lookup walks the artifact's directory
    pub scan: ScanOptions,
}

impl Default for LaunchProfile {
    fn default() -> Self {
        Self {
            artifact_marker: "-jar".to_string(),
            classpath_marker: "-cp".to_string(),
            excluded_flag_prefixes: vec![
                "-agentlib".to_string(),
                "-agentpath".to_string(),
                "-javaagent".to_string(),
            ],
            artifact_extensions: vec!["jar".to_string()],
            default_dependency_path: ".".to_string(),
            scan: ScanOptions::default(),
        }
    }
}

impl LaunchProfile {
    /// Whether a runtime flag would re-attach an instrumentation agent.
    pub fn is_excluded_flag(&self, flag: &str) -> bool {
        self.excluded_flag_prefixes.iter().any(|prefix| flag.starts_with(prefix.as_str()))
    }

    /// Whether `arg` names a packaged artifact, judged by extension.
    pub fn is_artifact(&self, arg: &str) -> bool {
        Path::new(arg)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.artifact_extensions.iter().any(|known| known == ext))
    }

    /// Whether `arg` is one of the launch-mode markers.
    pub fn is_marker(&self, arg: &str) -> bool {
        arg == self.artifact_marker || arg == self.classpath_marker
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
