//! # Project Locator (`common::project`)
//!
//! File: cli/src/common/project.rs
//!
//! A robot project is a version-controlled folder with a `robot.py` entry
//! point. Given candidate folders (the `--source` arguments, or the current
//! directory), the locator picks the first one that qualifies.
//!
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENTRY_POINT: &str = "robot.py";
pub const VCS_MARKER: &str = ".git";

/// Whether `dir` holds both `.git` and `robot.py`.
pub fn is_project_dir(dir: &Path) -> bool {
    dir.join(VCS_MARKER).exists() && dir.join(ENTRY_POINT).is_file()
}

/// The first candidate that is a robot project.
pub fn find_project(candidates: &[PathBuf]) -> Option<PathBuf> {
    let found = candidates.iter().find(|dir| is_project_dir(dir)).cloned();
    match &found {
        Some(dir) => debug!("Using project folder {}", dir.display()),
        None => debug!("None of {:?} is a robot project", candidates),
    }
    found
}
