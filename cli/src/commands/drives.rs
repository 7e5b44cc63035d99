//! # srdeploy Drives Command
//!
//! File: cli/src/commands/drives.rs
//!
//! `srdeploy drives` lists the drives a deployment would offer, in the same
//! order and with the same details as the deploy menu.
//!
//! ```text
//! "ROBOT" (E:\)
//!     Robot Memory Stick - Last deployed on 03/09/24 @ 14:05:07 - 2 logs
//! F:\
//!     No past deployment
//! ```
//!
use crate::common::drives::{self, Drive};
use crate::core::config::Config;
use crate::core::error::Result;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "List detected drives and their deployment status")]
pub struct DrivesArgs {}

pub fn handle_drives(_args: DrivesArgs, cfg: &Config) -> Result<()> {
    info!("Handling drives command...");
    let enumerator = drives::platform_enumerator(cfg);
    let found = drives::discover(enumerator.as_ref(), &cfg.ignored_drive_set())?;
    print!("{}", render_drive_list(&found));
    Ok(())
}

fn render_drive_list(drives: &[Drive]) -> String {
    if drives.is_empty() {
        return "No memory stick!\n".to_string();
    }
    drives
        .iter()
        .map(|d| format!("{}\n    {}\n", d.label(), d.summary()))
        .collect()
}
