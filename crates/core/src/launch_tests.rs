// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::scan::{FsLocator, LocateError};
use std::cell::Cell;
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const JAVA: &str = "/usr/lib/jvm/bin/java";

/// Lookup that counts calls and answers with a fixed result.
struct FakeLookup {
    answer: Option<PathBuf>,
    calls: Cell<usize>,
}

impl FakeLookup {
    fn answering(path: &str) -> Self {
        Self { answer: Some(PathBuf::from(path)), calls: Cell::new(0) }
    }

    fn failing() -> Self {
        Self { answer: None, calls: Cell::new(0) }
    }
}

impl ArtifactLookup for FakeLookup {
    fn newest_version(&self, artifact: &Path) -> Result<PathBuf, LocateError> {
        self.calls.set(self.calls.get() + 1);
        self.answer.clone().ok_or_else(|| LocateError::NotFound {
            dir: artifact.parent().unwrap_or(Path::new(".")).to_path_buf(),
            pattern: "^app-.+\\.jar$".to_string(),
        })
    }
}

fn request(flags: &[&str], args: &[&str], with_update: bool) -> RelaunchRequest {
    RelaunchRequest {
        executable: PathBuf::from(JAVA),
        runtime_flags: flags.iter().map(|s| s.to_string()).collect(),
        command_args: args.iter().map(|s| s.to_string()).collect(),
        dependency_path: None,
        with_update,
    }
}

#[test]
fn artifact_mode_preserves_layout() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::failing();
    let builder = CommandLineBuilder::new(&profile, &lookup);

    let descriptor =
        builder.build(&request(&["-Xmx100M"], &["app-1.0.jar", "-p", "8080"], false)).unwrap();

    assert_eq!(descriptor.mode, LaunchMode::Artifact);
    assert_eq!(descriptor.len(), 6);
    assert_eq!(descriptor.argv(), vec![JAVA, "-Xmx100M", "-jar", "app-1.0.jar", "-p", "8080"]);
}

#[test]
fn without_update_never_looks_up() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::answering("app-9.9.jar");
    let builder = CommandLineBuilder::new(&profile, &lookup);

    let descriptor = builder.build(&request(&[], &["app-1.0.jar"], false)).unwrap();

    assert_eq!(descriptor.target, "app-1.0.jar");
    assert_eq!(lookup.calls.get(), 0);
}

#[test]
fn update_substitutes_newest_artifact() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::answering("app-1.2.jar");
    let builder = CommandLineBuilder::new(&profile, &lookup);

    let descriptor =
        builder.build(&request(&["-Xmx100M"], &["app-1.0.jar", "-p", "8080"], true)).unwrap();

    assert_eq!(lookup.calls.get(), 1);
    assert_eq!(descriptor.argv(), vec![JAVA, "-Xmx100M", "-jar", "app-1.2.jar", "-p", "8080"]);
}

#[test]
fn failed_lookup_keeps_current_artifact() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::failing();
    let builder = CommandLineBuilder::new(&profile, &lookup);

    let descriptor = builder.build(&request(&[], &["app-1.0.jar", "-p", "8080"], true)).unwrap();

    assert_eq!(lookup.calls.get(), 1);
    assert_eq!(descriptor.target, "app-1.0.jar");
    assert_eq!(descriptor.program_args, vec!["-p", "8080"]);
}

#[test]
fn update_against_real_directory() {
    let tmp = TempDir::new().unwrap();
    let old = tmp.path().join("app-1.0.jar");
    let new = tmp.path().join("app-1.2.jar");
    fs::write(&old, "old").unwrap();
    fs::write(&new, "new").unwrap();
    let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
    fs::File::options().write(true).open(&old).unwrap().set_modified(an_hour_ago).unwrap();

    let profile = LaunchProfile::default();
    let lookup = FsLocator::new(profile.scan);
    let builder = CommandLineBuilder::new(&profile, &lookup);
    let old_arg = old.to_str().unwrap();

    let updated = builder.build(&request(&["-Xmx100M"], &[old_arg, "-p", "8080"], true)).unwrap();
    let kept = builder.build(&request(&["-Xmx100M"], &[old_arg, "-p", "8080"], false)).unwrap();

    assert_eq!(updated.target, new.to_str().unwrap());
    assert_eq!(kept.target, old_arg);
    assert_eq!(updated.argv().len(), kept.argv().len());
    assert_eq!(updated.runtime_flags, kept.runtime_flags);
    assert_eq!(updated.program_args, kept.program_args);
}

#[yare::parameterized(
    without_update = { false },
    with_update    = { true },
)]
fn classpath_mode_ignores_update(with_update: bool) {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::answering("app-1.2.jar");
    let builder = CommandLineBuilder::new(&profile, &lookup);
    let mut req = request(&["-Xmx100M"], &["com.example.Main", "-p", "8080"], with_update);
    req.dependency_path = Some("lib/a.jar:lib/b.jar".to_string());

    let descriptor = builder.build(&req).unwrap();

    assert_eq!(lookup.calls.get(), 0);
    assert_eq!(descriptor.mode, LaunchMode::Classpath);
    assert_eq!(
        descriptor.argv(),
        vec![JAVA, "-Xmx100M", "-cp", "lib/a.jar:lib/b.jar", "com.example.Main", "-p", "8080"]
    );
    assert_eq!(descriptor.len(), 7);
}

#[test]
fn classpath_mode_falls_back_to_default_dependency_path() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::failing();
    let builder = CommandLineBuilder::new(&profile, &lookup);

    let descriptor = builder.build(&request(&[], &["com.example.Main"], false)).unwrap();

    assert_eq!(descriptor.dependency_path.as_deref(), Some("."));
    assert_eq!(descriptor.argv(), vec![JAVA, "-cp", ".", "com.example.Main"]);
}

#[test]
fn agent_flags_are_dropped_in_order() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::failing();
    let builder = CommandLineBuilder::new(&profile, &lookup);
    let flags = [
        "-Xms64M",
        "-agentlib:jdwp=transport=dt_socket,server=y,address=5005",
        "-Dmode=prod",
        "-javaagent:/opt/otel.jar",
        "-Xmx100M",
    ];

    let descriptor = builder.build(&request(&flags, &["app-1.0.jar"], false)).unwrap();

    assert_eq!(descriptor.runtime_flags, vec!["-Xms64M", "-Dmode=prod", "-Xmx100M"]);
    assert_eq!(descriptor.len(), 3 + 1 + 1 + 1);
}

#[test]
fn repeated_builds_are_identical() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::answering("app-1.2.jar");
    let builder = CommandLineBuilder::new(&profile, &lookup);
    let req = request(&["-Xmx100M"], &["app-1.0.jar", "-p", "8080"], true);

    assert_eq!(builder.build(&req).unwrap(), builder.build(&req).unwrap());
}

#[test]
fn empty_command_is_rejected() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::failing();
    let builder = CommandLineBuilder::new(&profile, &lookup);

    assert_eq!(builder.build(&request(&["-Xmx100M"], &[], true)), Err(BuildError::EmptyCommand));
    assert_eq!(lookup.calls.get(), 0);
}

#[test]
fn command_and_display_match_argv() {
    let profile = LaunchProfile::default();
    let lookup = FakeLookup::failing();
    let builder = CommandLineBuilder::new(&profile, &lookup);

    let descriptor = builder.build(&request(&["-Xmx100M"], &["app-1.0.jar", "-v"], false)).unwrap();
    let cmd = descriptor.to_command();

    assert_eq!(cmd.get_program(), JAVA);
    let args: Vec<_> = cmd.get_args().map(|a| a.to_str().unwrap()).collect();
    assert_eq!(args, vec!["-Xmx100M", "-jar", "app-1.0.jar", "-v"]);
    assert_eq!(descriptor.to_string(), format!("{JAVA} -Xmx100M -jar app-1.0.jar -v"));
}
