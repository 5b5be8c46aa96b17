// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reup-core: artifact discovery and relaunch command-line construction
//!
//! Nothing in this crate touches process state. The daemon crate captures the
//! running invocation and arms the relaunch; this crate decides what the new
//! command line looks like.

pub mod macros;

pub mod launch;
pub mod pattern;
pub mod profile;
pub mod scan;

pub use launch::{BuildError, CommandLineBuilder, LaunchDescriptor, LaunchMode, RelaunchRequest};
pub use pattern::{derive_pattern, ArtifactPattern, PatternError};
pub use profile::LaunchProfile;
pub use scan::{
    find_newest, list, newest_version, ArtifactCandidate, ArtifactLookup, ArtifactScan, FsLocator,
    LocateError, ScanOptions,
};
