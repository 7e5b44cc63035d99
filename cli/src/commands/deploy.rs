//! # srdeploy Deploy Command
//!
//! File: cli/src/commands/deploy.rs
//!
//! ## Overview
//!
//! `srdeploy deploy` is the main workflow: package the robot project and put
//! the resulting `robot.zip` on a memory stick.
//!
//! ## Architecture
//!
//! 1. Find drives (or take the one given with `--drive`). None → `No memory stick!`
//! 2. Find the project folder among the candidates. None → `Can't find source code`
//! 3. Ask which drive to deploy to. Cancelling ends the command; nothing is built.
//! 4. Build the archive, copy it to `<drive>/robot.zip`, release the build
//!    directory. The release happens whether or not the copy succeeded.
//!
//! `deploy` takes the drive enumerator, prompt and builder as parameters so
//! the whole flow runs in tests without real drives or a terminal.
//!
//! ## Examples
//!
//! ```bash
//! # Choose from the detected drives
//! srdeploy deploy
//!
//! # Deploy a specific folder to a specific drive, no questions asked
//! srdeploy deploy --source ~/robot --drive /media/ROBOT
//! ```
//!
use super::build::PackageArgs;
use crate::common::archive::builder::{ArchiveBuilder, ARCHIVE_NAME};
use crate::common::drives::{self, probe::probe_drive, DriveEnumerator};
use crate::common::fs::copy;
use crate::common::project;
use crate::common::ui::{Choice, Prompt, TerminalPrompt};
use crate::core::config::Config;
use crate::core::error::{DeployError, Result};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

/// # Deploy Arguments (`DeployArgs`)
#[derive(Parser, Debug)]
#[command(about = "Build robot.zip and copy it to a memory stick")]
pub struct DeployArgs {
    /// Candidate project folder; the first one containing both .git and
    /// robot.py is deployed. Defaults to the current directory. Repeatable.
    #[arg(long = "source", short = 's', value_name = "DIR")]
    pub sources: Vec<PathBuf>,

    /// Deploy to this drive instead of choosing from the detected ones.
    #[arg(long, short, value_name = "PATH")]
    pub drive: Option<PathBuf>,

    #[command(flatten)]
    pub package: PackageArgs,
}

/// Everything `deploy` needs, resolved from arguments and configuration.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub sources: Vec<PathBuf>,
    pub drive: Option<PathBuf>,
    pub template: PathBuf,
    pub ignore: Vec<String>,
}

/// # Handle Deploy Command (`handle_deploy`)
pub fn handle_deploy(args: DeployArgs, cfg: &Config) -> Result<()> {
    info!("Handling deploy command...");
    let (template, ignore) = args.package.resolve(cfg)?;
    let sources = if args.sources.is_empty() {
        vec![std::env::current_dir().context("Failed to get current directory")?]
    } else {
        args.sources
    };
    let request = DeployRequest {
        sources,
        drive: args.drive,
        template,
        ignore,
    };

    let enumerator = drives::platform_enumerator(cfg);
    let mut prompt = TerminalPrompt::stdio();
    deploy(
        &request,
        cfg,
        enumerator.as_ref(),
        &mut prompt,
        &ArchiveBuilder::new(),
    )?;
    Ok(())
}

/// Runs the deployment workflow.
///
/// # Returns
///
/// * `Ok(Some(path))` - The archive was written to `path` on the chosen drive.
/// * `Ok(None)` - The user cancelled the drive choice; nothing was built.
///
/// # Errors
///
/// `NoDrives`, `DriveNotFound`, `ProjectNotFound`, any `ArchiveBuilder` error,
/// or a failed copy. The build directory is released on every path after it
/// has been created.
pub fn deploy(
    request: &DeployRequest,
    cfg: &Config,
    enumerator: &dyn DriveEnumerator,
    prompt: &mut dyn Prompt,
    builder: &ArchiveBuilder,
) -> Result<Option<PathBuf>> {
    let drives = match &request.drive {
        Some(path) => {
            if !path.is_dir() {
                return Err(DeployError::DriveNotFound { path: path.clone() }.into());
            }
            vec![probe_drive(path.clone(), None)]
        }
        None => drives::discover(enumerator, &cfg.ignored_drive_set())?,
    };
    if drives.is_empty() {
        return Err(DeployError::NoDrives.into());
    }

    let source = project::find_project(&request.sources).ok_or(DeployError::ProjectNotFound)?;
    prompt.notify(&format!("Exporting from {}...", source.display()));

    let selected = if request.drive.is_some() {
        Some(0)
    } else {
        let choices: Vec<Choice> = drives
            .iter()
            .map(|d| Choice::new(format!("Deploy to {}", d.label()), d.summary()))
            .collect();
        prompt.choose_one(&choices)?
    };
    let Some(drive) = selected.and_then(|i| drives.get(i)) else {
        prompt.notify("Deployment cancelled.");
        return Ok(None);
    };
    debug!("Deploying to {}", drive.path.display());

    let built = builder.build(&source, &request.template, &request.ignore)?;
    debug!("Build directory {}", built.dir().display());
    let target = drive.path.join(ARCHIVE_NAME);
    let copied = copy::copy_file_to(built.path(), &target);
    let released = built.release();

    copied.with_context(|| format!("Failed to copy archive to {}", target.display()))?;
    released?;
    prompt.notify(&format!("Zip deployed successfully to {}!", target.display()));
    Ok(Some(target))
}
