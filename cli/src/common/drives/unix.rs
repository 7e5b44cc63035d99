//! # Mount-Point Enumerator (`common::drives::unix`)
//!
//! File: cli/src/common/drives/unix.rs
//!
//! Desktop Linux mounts removable media as directories under `/media`
//! (macOS uses `/Volumes`). Each child directory of a configured mount root
//! is reported as a drive. Mount points carry no separate volume label, so
//! drives found here have no `name`.
//!
use super::{is_excluded, probe::probe_drive, Drive, DriveEnumerator};
use crate::core::error::Result;
use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UnixMountEnumerator {
    roots: Vec<PathBuf>,
}

impl UnixMountEnumerator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        UnixMountEnumerator { roots }
    }
}

impl DriveEnumerator for UnixMountEnumerator {
    fn list(&self, excluding: &HashSet<String>) -> Result<Vec<Drive>> {
        let mut drives = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                debug!("Mount root {} does not exist, skipping", root.display());
                continue;
            }
            let mut mounts: Vec<PathBuf> = fs::read_dir(root)
                .with_context(|| format!("Failed to list mount root {}", root.display()))?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .collect();
            mounts.sort();
            for mount in mounts {
                if is_excluded(&mount, None, excluding) {
                    continue;
                }
                drives.push(probe_drive(mount, None));
            }
        }
        Ok(drives)
    }
}
