//! # srdeploy Drive Discovery (`common::drives`)
//!
//! File: cli/src/common/drives/mod.rs
//!
//! ## Overview
//!
//! A "drive" is a removable volume that can receive `robot.zip` or hold the
//! robot's logs. This module defines the `Drive` model and the
//! `DriveEnumerator` capability, with one implementation per platform family:
//!
//! - **`unix`**: `UnixMountEnumerator` treats every directory under the
//!   configured mount roots (default `/media`) as a drive.
//! - **`windows`**: `WindowsVolumeEnumerator` walks the logical drive letters
//!   and reads each volume label.
//! - **`probe`**: Fills in the per-drive metadata both enumerators share
//!   (`.srobo` marker, last deployment time, log files).
//!
//! ## Usage
//!
//! ```rust
//! let enumerator = drives::platform_enumerator(&cfg);
//! let drives = drives::discover(enumerator.as_ref(), &cfg.ignored_drive_set())?;
//! for drive in &drives {
//!     println!("{} - {}", drive.label(), drive.summary());
//! }
//! ```
//!
use crate::core::config::Config;
use crate::core::error::Result;
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod probe;
pub mod unix;
#[cfg(windows)]
pub mod windows;

/// A storage volume considered as a deployment destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    /// Root of the volume (`E:\`, `/media/ROBOT`).
    pub path: PathBuf,
    /// Volume label, when the platform reports one.
    pub name: Option<String>,
    /// Whether the `.srobo` marker file sits at the root.
    pub has_marker: bool,
    /// Modification time of an existing `robot.zip` on the drive.
    pub last_deployed: Option<DateTime<Local>>,
    /// `log*` files at the root followed by `old-logs/log*`.
    pub log_files: Vec<PathBuf>,
}

impl Drive {
    /// `"LABEL" (path)` when the volume has a label, otherwise just the path.
    pub fn label(&self) -> String {
        match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("\"{}\" ({})", name, self.path.display()),
            None => self.path.display().to_string(),
        }
    }

    /// One-line description used in drive menus and `srdeploy drives`.
    pub fn summary(&self) -> String {
        let mut info = Vec::new();
        if self.has_marker {
            info.push("Robot Memory Stick".to_string());
        }
        match &self.last_deployed {
            Some(when) => info.push(format!("Last deployed on {}", when.format("%x @ %X"))),
            None => info.push("No past deployment".to_string()),
        }
        if !self.log_files.is_empty() {
            info.push(format!("{} logs", self.log_files.len()));
        }
        info.join(" - ")
    }
}

/// Lists the drives currently attached to the machine.
pub trait DriveEnumerator {
    /// Returns every drive whose path or name is not in `excluding`.
    fn list(&self, excluding: &HashSet<String>) -> Result<Vec<Drive>>;
}

/// The enumerator for the platform srdeploy was compiled for.
pub fn platform_enumerator(cfg: &Config) -> Box<dyn DriveEnumerator> {
    #[cfg(windows)]
    {
        let _ = cfg;
        Box::new(windows::WindowsVolumeEnumerator)
    }
    #[cfg(not(windows))]
    {
        Box::new(unix::UnixMountEnumerator::new(
            cfg.mount_roots.iter().map(PathBuf::from).collect(),
        ))
    }
}

/// Enumerates drives and orders them for a deployment menu.
pub fn discover(enumerator: &dyn DriveEnumerator, excluding: &HashSet<String>) -> Result<Vec<Drive>> {
    let mut drives = enumerator.list(excluding)?;
    sort_for_deployment(&mut drives);
    info!("Found {} drive(s)", drives.len());
    Ok(drives)
}

/// Puts drives carrying the `.srobo` marker first, keeping the order otherwise.
pub fn sort_for_deployment(drives: &mut [Drive]) {
    drives.sort_by_key(|d| !d.has_marker);
}

/// Whether a drive at `path` named `name` matches any identifier in `excluding`.
///
/// Identifiers compare case-insensitively and without trailing `\`, `/` or
/// `:`, so `c`, `C:` and `C:\` all exclude the same drive.
pub fn is_excluded(path: &Path, name: Option<&str>, excluding: &HashSet<String>) -> bool {
    if excluding.is_empty() {
        return false;
    }
    let path_id = normalize_identifier(&path.to_string_lossy());
    let name_id = name.map(normalize_identifier);
    let hit = excluding.iter().map(|e| normalize_identifier(e)).any(|id| {
        id == path_id || name_id.as_deref() == Some(id.as_str())
    });
    if hit {
        debug!("Excluding drive {}", path.display());
    }
    hit
}

fn normalize_identifier(id: &str) -> String {
    id.trim()
        .trim_end_matches(['/', '\\', ':'])
        .to_lowercase()
}
