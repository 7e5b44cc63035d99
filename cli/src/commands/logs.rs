//! # srdeploy Logs Command
//!
//! File: cli/src/commands/logs.rs
//!
//! ## Overview
//!
//! The robot writes `log*` files to its memory stick and rotates older ones
//! into `old-logs/`. `srdeploy logs` picks a drive that has logs (or the one
//! given with `--drive`), joins every log file into one read-only listing,
//! and prints it to stdout. Each file is introduced by a `==> path <==`
//! header; current logs come before `old-logs/`.
//!
//! ## Examples
//!
//! ```bash
//! srdeploy logs
//! srdeploy logs --drive /media/ROBOT > robot-logs.txt
//! ```
//!
use crate::common::drives::{self, probe::probe_drive, Drive, DriveEnumerator};
use crate::common::fs::io;
use crate::common::ui::{Choice, Prompt, TerminalPrompt};
use crate::core::config::Config;
use crate::core::error::{DeployError, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

/// # Logs Arguments (`LogsArgs`)
#[derive(Parser, Debug)]
#[command(about = "Show the robot's log files from a memory stick")]
pub struct LogsArgs {
    /// Read logs from this drive instead of choosing from the detected ones.
    #[arg(long, short, value_name = "PATH")]
    pub drive: Option<PathBuf>,
}

/// # Handle Logs Command (`handle_logs`)
pub fn handle_logs(args: LogsArgs, cfg: &Config) -> Result<()> {
    info!("Handling logs command...");
    let enumerator = drives::platform_enumerator(cfg);
    let mut prompt = TerminalPrompt::stdio();
    if let Some(listing) = show_logs(args.drive, cfg, enumerator.as_ref(), &mut prompt)? {
        print!("{}", listing);
    }
    Ok(())
}

/// Selects a drive and returns the joined contents of its logs.
///
/// `Ok(None)` when the choice was cancelled or there was nothing to show; the
/// reason has already been passed to `prompt.notify`.
pub fn show_logs(
    drive: Option<PathBuf>,
    cfg: &Config,
    enumerator: &dyn DriveEnumerator,
    prompt: &mut dyn Prompt,
) -> Result<Option<String>> {
    let drive = match drive {
        Some(path) => {
            if !path.is_dir() {
                return Err(DeployError::DriveNotFound { path }.into());
            }
            probe_drive(path, None)
        }
        None => match choose_log_drive(cfg, enumerator, prompt)? {
            Some(drive) => drive,
            None => return Ok(None),
        },
    };

    if drive.log_files.is_empty() {
        prompt.notify(&format!("No logs found on {}", drive.label()));
        return Ok(None);
    }
    render_logs(&drive).map(Some)
}

fn choose_log_drive(
    cfg: &Config,
    enumerator: &dyn DriveEnumerator,
    prompt: &mut dyn Prompt,
) -> Result<Option<Drive>> {
    let mut with_logs: Vec<Drive> = drives::discover(enumerator, &cfg.ignored_drive_set())?
        .into_iter()
        .filter(|d| !d.log_files.is_empty())
        .collect();
    if with_logs.is_empty() {
        prompt.notify("No logs found on any drive");
        return Ok(None);
    }
    let choices: Vec<Choice> = with_logs
        .iter()
        .map(|d| Choice::new(format!("Show logs from {}", d.label()), d.summary()))
        .collect();
    match prompt.choose_one(&choices)? {
        Some(index) if index < with_logs.len() => Ok(Some(with_logs.swap_remove(index))),
        _ => Ok(None),
    }
}

/// Concatenates the drive's log files, each under a `==> path <==` header.
pub fn render_logs(drive: &Drive) -> Result<String> {
    let mut listing = String::new();
    for (i, log) in drive.log_files.iter().enumerate() {
        debug!("Reading {}", log.display());
        let text = io::read_file_lossy(log)?;
        if i > 0 {
            listing.push('\n');
        }
        listing.push_str(&format!("==> {} <==\n", log.display()));
        listing.push_str(&text);
        if !text.is_empty() && !text.ends_with('\n') {
            listing.push('\n');
        }
    }
    Ok(listing)
}
