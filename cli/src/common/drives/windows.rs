//! # Volume Enumerator (`common::drives::windows`)
//!
//! File: cli/src/common/drives/windows.rs
//!
//! Reports every mounted drive letter, labelled with its volume name. The
//! "No disk in drive" dialog Windows raises for empty card readers is
//! suppressed while the drives are probed.
//!
use super::{is_excluded, probe::probe_drive, Drive, DriveEnumerator};
use crate::core::error::Result;
use anyhow::Context;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::PathBuf;
use std::ptr::null_mut;
use tracing::debug;
use windows_sys::Win32::Storage::FileSystem::{GetLogicalDrives, GetVolumeInformationW};
use windows_sys::Win32::System::Diagnostics::Debug::{SetErrorMode, SEM_FAILCRITICALERRORS};

const MAX_LABEL_LEN: usize = 261;

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsVolumeEnumerator;

impl DriveEnumerator for WindowsVolumeEnumerator {
    fn list(&self, excluding: &HashSet<String>) -> Result<Vec<Drive>> {
        // SAFETY: SetErrorMode only changes the process error mode flags.
        let previous_mode = unsafe { SetErrorMode(SEM_FAILCRITICALERRORS) };
        let result = list_volumes(excluding);
        // SAFETY: as above; restores the mode captured before enumeration.
        unsafe { SetErrorMode(previous_mode) };
        result
    }
}

fn list_volumes(excluding: &HashSet<String>) -> Result<Vec<Drive>> {
    // SAFETY: GetLogicalDrives takes no arguments and returns a bitmask.
    let mask = unsafe { GetLogicalDrives() };
    if mask == 0 {
        return Err(io::Error::last_os_error()).context("GetLogicalDrives failed");
    }

    let mut drives = Vec::new();
    for (bit, letter) in (b'A'..=b'Z').enumerate() {
        if (mask >> bit) & 1 == 0 {
            continue;
        }
        let root = format!("{}:\\", letter as char);
        let name = volume_label(&root);
        debug!("Drive {} labelled {:?}", root, name);
        let path = PathBuf::from(&root);
        if is_excluded(&path, name.as_deref(), excluding) {
            continue;
        }
        drives.push(probe_drive(path, name));
    }
    Ok(drives)
}

fn volume_label(root: &str) -> Option<String> {
    let wide_root: Vec<u16> = OsStr::new(root).encode_wide().chain(once(0)).collect();
    let mut label = [0u16; MAX_LABEL_LEN];
    // SAFETY: wide_root is NUL-terminated and label is a writable buffer of
    // the length passed; the optional out-parameters are null.
    let ok = unsafe {
        GetVolumeInformationW(
            wide_root.as_ptr(),
            label.as_mut_ptr(),
            label.len() as u32,
            null_mut(),
            null_mut(),
            null_mut(),
            null_mut(),
            0,
        )
    };
    if ok == 0 {
        return None;
    }
    let len = label.iter().position(|&c| c == 0).unwrap_or(label.len());
    let label = String::from_utf16_lossy(&label[..len]);
    (!label.is_empty()).then_some(label)
}
