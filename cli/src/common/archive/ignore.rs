//! # Ignore Rules (`common::archive::ignore`)
//!
//! File: cli/src/common/archive/ignore.rs
//!
//! Compiles the `ignore` configuration into a single `globset::GlobSet`.
//! Patterns are tested against a single path component (the base name of a
//! file or directory), never against a full path, so `.git` excludes every
//! directory literally named `.git` at any depth. A name is ignored when any
//! pattern matches it; an empty rule set ignores nothing.
//!
//! Matching is case-insensitive on Windows, where file names are too.
//!
use crate::core::error::{DeployError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;
use tracing::debug;

/// A compiled, immutable set of ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    set: GlobSet,
}

impl IgnoreRules {
    /// Compiles `patterns` into one matcher.
    ///
    /// Every pattern is compiled before anything else happens, so a bad
    /// pattern fails the build up front rather than halfway through a walk.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::PatternCompile` naming the first pattern that
    /// does not parse.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(cfg!(windows))
                .build()
                .map_err(|e| DeployError::PatternCompile {
                    pattern: pattern.to_string(),
                    reason: e.kind().to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| DeployError::PatternCompile {
            pattern: e.glob().unwrap_or_default().to_string(),
            reason: e.kind().to_string(),
        })?;
        debug!("Compiled {} ignore pattern(s)", set.len());
        Ok(IgnoreRules { set })
    }

    /// Returns `true` if the base name `name` matches any pattern.
    pub fn is_ignored(&self, name: &OsStr) -> bool {
        !self.set.is_empty() && self.set.is_match(name)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
