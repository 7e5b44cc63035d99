//! # srdeploy Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout srdeploy. The archive
//! builder reports its failures through a small, fixed taxonomy so that the
//! orchestration layer (and tests) can tell a missing source tree apart from a
//! corrupt template or a failed write:
//!
//! - `SourceNotFound`: the source directory is missing or unreadable
//! - `TemplateUnavailable`: the template archive is missing or corrupt
//! - `ArchiveWrite`: appending an entry to the working archive failed
//! - `PatternCompile`: an `ignore` glob could not be compiled
//!
//! The remaining variants cover configuration, filesystem, and drive
//! selection problems raised by the commands.
//!
//! ## Architecture
//!
//! - `DeployError`: A custom error enum using `thiserror`
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! None of these errors are retried. A failure on removable media should be
//! visible to the person deploying, not masked.
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !source.is_dir() {
//!     return Err(DeployError::SourceNotFound { path: source.to_path_buf() }.into());
//! }
//!
//! // Pattern matching on error types
//! match builder.build(&source, &template, &patterns) {
//!     Err(e) if matches!(e.downcast_ref::<DeployError>(), Some(DeployError::SourceNotFound { .. })) => {
//!         prompt.notify("Can't find source code");
//!     }
//!     other => { /* ... */ }
//! }
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for srdeploy.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Can't find source code at '{}'", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Template archive '{}' is unavailable: {reason}", path.display())]
    TemplateUnavailable { path: PathBuf, reason: String },

    #[error("Failed to write archive: {0}")]
    ArchiveWrite(String),

    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    PatternCompile { pattern: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("No memory stick!")]
    NoDrives,

    #[error("Can't find source code (no folder with both .git and robot.py)")]
    ProjectNotFound,

    #[error("Drive '{}' not found.", path.display())]
    DriveNotFound { path: PathBuf },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
