//! # Drive Metadata Probe (`common::drives::probe`)
//!
//! File: cli/src/common/drives/probe.rs
//!
//! Reads what srdeploy wants to know about a drive from files at its root:
//!
//! - `.srobo`: present on sticks prepared for a robot
//! - `robot.zip`: its modification time is the last deployment time
//! - `log*` and `old-logs/log*`: logs written by the robot
//!
use super::Drive;
use crate::common::archive::builder::ARCHIVE_NAME;
use crate::core::error::Result;
use anyhow::Context;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MARKER_FILE: &str = ".srobo";
pub const OLD_LOGS_DIR: &str = "old-logs";
const LOG_PREFIX: &str = "log";

/// Builds a `Drive` for `path`, reading its marker, deployment time and logs.
///
/// Problems reading one drive are logged and treated as "absent" so that a
/// single odd volume does not hide the others.
pub fn probe_drive(path: PathBuf, name: Option<String>) -> Drive {
    let has_marker = path.join(MARKER_FILE).exists();
    let last_deployed = last_deployed(&path).unwrap_or_else(|e| {
        warn!("Could not read deployment time on {}: {:#}", path.display(), e);
        None
    });
    let log_files = find_log_files(&path);
    debug!(
        "Probed {}: marker={}, deployed={:?}, logs={}",
        path.display(),
        has_marker,
        last_deployed,
        log_files.len()
    );
    Drive {
        path,
        name,
        has_marker,
        last_deployed,
        log_files,
    }
}

/// When `robot.zip` on the drive was last written.
///
/// # Returns
///
/// * `Ok(None)` - The drive has never been deployed to.
/// * `Ok(Some(time))` - The archive's modification time, in local time.
///
/// # Errors
///
/// Any failure other than the archive being absent.
pub fn last_deployed(drive: &Path) -> Result<Option<DateTime<Local>>> {
    let archive = drive.join(ARCHIVE_NAME);
    match fs::metadata(&archive) {
        Ok(meta) => {
            let modified = meta
                .modified()
                .with_context(|| format!("No modification time for {}", archive.display()))?;
            Ok(Some(DateTime::<Local>::from(modified)))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to stat {}", archive.display())),
    }
}

/// Log files on the drive: root `log*` first, then `old-logs/log*`, each
/// group sorted by file name.
pub fn find_log_files(drive: &Path) -> Vec<PathBuf> {
    let mut logs = logs_in(drive);
    let old = drive.join(OLD_LOGS_DIR);
    if old.is_dir() {
        logs.extend(logs_in(&old));
    }
    logs
}

fn logs_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut logs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| is_log_name(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    logs.sort();
    logs
}

fn is_log_name(name: &str) -> bool {
    if cfg!(windows) {
        name.to_ascii_lowercase().starts_with(LOG_PREFIX)
    } else {
        name.starts_with(LOG_PREFIX)
    }
}
