// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-agnostic filename matching for build artifacts.
//!
//! Artifact versions follow no fixed grammar (`1.0`, `1.0-SNAPSHOT`,
//! `1.2.3-rc1`), so the rule is derived from structural position only: the
//! stable prefix before the first `-<digit>` and the trailing extension.

use regex::Regex;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// A filename match rule.
///
/// Derived rules are matched structurally; [`ArtifactPattern::from_regex`]
/// accepts an arbitrary expression for callers that need one.
#[derive(Debug, Clone)]
pub struct ArtifactPattern {
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    /// `<prefix>` + at least one character + `<suffix>`
    Versioned { prefix: String, suffix: String },
    Exact(String),
    Regex(Regex),
}

/// Errors from building a custom pattern
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid artifact pattern '{pattern}': {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Derive a match rule from a concrete versioned path.
///
/// `libs/foo-bar-1.0-Alpha1.jar` yields a rule matching `foo-bar-<anything>.jar`.
/// Filenames without an extension or without a separable version segment
/// degrade to an exact match on the filename.
pub fn derive_pattern(path: &Path) -> ArtifactPattern {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return ArtifactPattern::exact(""),
    };
    match split_versioned(&name) {
        Some((prefix, suffix)) => ArtifactPattern {
            matcher: Matcher::Versioned { prefix: prefix.to_string(), suffix: suffix.to_string() },
        },
        None => ArtifactPattern::exact(&name),
    }
}

/// Split `name` into (prefix including the trailing `-`, `.ext`).
fn split_versioned(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    let (stem, suffix) = name.split_at(dot);
    let ext = &suffix[1..];
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    // First '-' immediately followed by a digit starts the version segment.
    // Requiring index >= 2 keeps the prefix non-empty before the '-'.
    let bytes = stem.as_bytes();
    let split = (2..stem.len()).find(|&i| bytes[i - 1] == b'-' && bytes[i].is_ascii_digit())?;
    Some((&stem[..split], suffix))
}

impl ArtifactPattern {
    /// Rule that matches only `name`.
    pub fn exact(name: &str) -> Self {
        Self { matcher: Matcher::Exact(name.to_string()) }
    }

    /// Rule from a full-match regular expression (anchors are added).
    pub fn from_regex(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|source| PatternError::Invalid { pattern: pattern.to_string(), source })?;
        Ok(Self { matcher: Matcher::Regex(regex) })
    }

    /// Whether `file_name` satisfies this rule.
    pub fn matches(&self, file_name: &str) -> bool {
        match &self.matcher {
            Matcher::Versioned { prefix, suffix } => {
                file_name.len() > prefix.len() + suffix.len()
                    && file_name.starts_with(prefix.as_str())
                    && file_name.ends_with(suffix.as_str())
            }
            Matcher::Exact(name) => file_name == name,
            Matcher::Regex(regex) => regex.is_match(file_name),
        }
    }

    /// True when derivation found no version segment.
    pub fn is_exact(&self) -> bool {
        matches!(self.matcher, Matcher::Exact(_))
    }
}

impl fmt::Display for ArtifactPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matcher {
            Matcher::Versioned { prefix, suffix } => {
                write!(f, "^{}.+{}$", regex::escape(prefix), regex::escape(suffix))
            }
            Matcher::Exact(name) => write!(f, "^{}$", regex::escape(name)),
            Matcher::Regex(regex) => f.write_str(regex.as_str()),
        }
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
