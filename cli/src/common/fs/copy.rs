//! # srdeploy Filesystem Copy Operations
//!
//! File: cli/src/common/fs/copy.rs
//!
//! ## Overview
//!
//! Deploying means copying `robot.zip` onto a memory stick that may be pulled
//! out at any moment. `copy_file_to` therefore writes to a sibling `.part`
//! file, flushes it to the device, and only then renames it over the target.
//! A failed copy removes the `.part` file, so the drive either keeps its
//! previous `robot.zip` or gets the complete new one.
//!
use crate::core::error::{DeployError, Result};
use anyhow::Context;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Copies `source` to `target`, replacing any existing file.
///
/// # Returns
///
/// * `Result<u64>` - Number of bytes copied.
///
/// # Errors
///
/// Returns an `Err` if the target directory does not exist, or if reading,
/// writing, flushing, or the final rename fails.
pub fn copy_file_to(source: &Path, target: &Path) -> Result<u64> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !parent.is_dir() {
        anyhow::bail!(DeployError::FileSystem(format!(
            "Destination directory {} does not exist",
            parent.display()
        )));
    }

    let partial = partial_path(target);
    debug!("Copying {} to {}", source.display(), partial.display());
    match write_and_sync(source, &partial) {
        Ok(bytes) => {
            fs::rename(&partial, target).with_context(|| {
                format!("Failed to move {} into place", partial.display())
            })?;
            info!("Copied {} bytes to {}", bytes, target.display());
            Ok(bytes)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", partial.display(), cleanup);
                }
            }
            Err(e)
        }
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

fn write_and_sync(source: &Path, partial: &Path) -> Result<u64> {
    let mut input =
        File::open(source).with_context(|| format!("Failed to open {}", source.display()))?;
    let mut output = File::create(partial)
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    let bytes = io::copy(&mut input, &mut output)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    output
        .sync_all()
        .with_context(|| format!("Failed to flush {}", partial.display()))?;
    Ok(bytes)
}
