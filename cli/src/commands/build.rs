//! # srdeploy Build Command
//!
//! File: cli/src/commands/build.rs
//!
//! ## Overview
//!
//! `srdeploy build` produces `robot.zip` without a drive: the merged archive
//! is written to `--output`. It is the same packaging step `deploy` runs, and
//! is handy for checking what would be shipped to the robot.
//!
//! ## Examples
//!
//! ```bash
//! srdeploy build --source ~/robot --template ~/sr/pyenv.zip --output /tmp/robot.zip
//! srdeploy build -s . -o ../robot.zip --ignore '*.log' --ignore tests
//! ```
//!
//! `--output` must not lie inside `--source`, or the next build would pack
//! the previous archive as `user/robot.zip`.
//!
//! This module also defines `PackageArgs`, the `--template` / `--ignore`
//! options shared with `deploy`.
//!
use crate::common::archive::builder::ArchiveBuilder;
use crate::common::fs::{copy, io};
use crate::core::config::Config;
use crate::core::error::{DeployError, Result};
use anyhow::{anyhow, Context};
use clap::{Args, Parser};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Packaging options shared by `build` and `deploy`.
#[derive(Args, Debug, Clone, Default)]
pub struct PackageArgs {
    /// Template archive to merge the project into (overrides `template` in the config).
    #[arg(long, value_name = "ZIP", env = "SRDEPLOY_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Additional ignore pattern, applied after the configured ones. Repeatable.
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,
}

impl PackageArgs {
    /// The template path and the full ignore list for this run.
    ///
    /// # Errors
    ///
    /// `DeployError::Config` if no template was given or configured.
    pub fn resolve(&self, cfg: &Config) -> Result<(PathBuf, Vec<String>)> {
        let template = self
            .template
            .clone()
            .or_else(|| cfg.template_path())
            .ok_or_else(|| {
                anyhow!(DeployError::Config(
                    "No template archive configured. Set `template` in the config or pass --template."
                        .to_string()
                ))
            })?;
        let mut patterns = cfg.ignore.clone();
        patterns.extend(self.ignore.iter().cloned());
        debug!("Template {}, ignore patterns {:?}", template.display(), patterns);
        Ok((template, patterns))
    }
}

/// # Build Arguments (`BuildArgs`)
#[derive(Parser, Debug)]
#[command(about = "Build robot.zip from a project folder without deploying it")]
pub struct BuildArgs {
    /// The project folder to package.
    #[arg(long, short, value_name = "DIR")]
    pub source: PathBuf,

    /// Where to write the finished archive.
    #[arg(long, short, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub package: PackageArgs,
}

/// # Handle Build Command (`handle_build`)
///
/// Builds the archive in a scoped temporary directory, copies it to
/// `--output`, then releases the temporary directory whether or not the copy
/// succeeded.
pub fn handle_build(args: BuildArgs, cfg: &Config) -> Result<()> {
    info!("Handling build command...");
    let (template, patterns) = args.package.resolve(cfg)?;
    if lies_within(&args.output, &args.source) {
        return Err(DeployError::FileSystem(format!(
            "Output {} is inside the project folder {}",
            args.output.display(),
            args.source.display()
        ))
        .into());
    }

    let built = ArchiveBuilder::new().build(&args.source, &template, &patterns)?;
    let copied = (|| -> Result<u64> {
        if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            io::ensure_dir_exists(parent)?;
        }
        copy::copy_file_to(built.path(), &args.output)
    })();
    let released = built.release();

    let bytes = copied
        .with_context(|| format!("Failed to write archive to {}", args.output.display()))?;
    released?;
    println!("Wrote {} ({} bytes)", args.output.display(), bytes);
    Ok(())
}

/// Whether `path` (which need not exist yet) resolves to somewhere under `dir`.
fn lies_within(path: &Path, dir: &Path) -> bool {
    let Ok(dir) = dir.canonicalize() else {
        return false;
    };
    let absolute = match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => return false,
    };
    absolute
        .ancestors()
        .find(|a| a.exists())
        .and_then(|a| a.canonicalize().ok())
        .is_some_and(|a| a.starts_with(&dir))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_build_args() {
        let args = BuildArgs::try_parse_from([
            "build", "--source", "proj", "-o", "out.zip", "--ignore", "*.pyc", "--ignore", ".git",
        ])
        .unwrap();
        assert_eq!(args.source, PathBuf::from("proj"));
        assert_eq!(args.output, PathBuf::from("out.zip"));
        assert_eq!(args.package.ignore, vec!["*.pyc", ".git"]);
    }

    #[test]
    fn test_build_requires_source_and_output() {
        assert!(BuildArgs::try_parse_from(["build", "--source", "proj"]).is_err());
        assert!(BuildArgs::try_parse_from(["build", "-o", "out.zip"]).is_err());
    }

    #[test]
    fn test_resolve_prefers_flag_and_appends_patterns() {
        let cfg = Config {
            ignore: vec![".git".into()],
            template: Some("/configured/template.zip".into()),
            ..Default::default()
        };
        let package = PackageArgs {
            template: Some(PathBuf::from("/flag/template.zip")),
            ignore: vec!["*.pyc".into()],
        };
        let (template, patterns) = package.resolve(&cfg).unwrap();
        assert_eq!(template, PathBuf::from("/flag/template.zip"));
        assert_eq!(patterns, vec![".git", "*.pyc"]);

        let (template, _) = PackageArgs::default().resolve(&cfg).unwrap();
        assert_eq!(template, PathBuf::from("/configured/template.zip"));
    }

    #[test]
    fn test_lies_within() -> Result<()> {
        let base = tempfile::tempdir()?;
        let project = base.path().join("project");
        std::fs::create_dir_all(project.join("helpers"))?;

        assert!(lies_within(&project.join("robot.zip"), &project));
        assert!(lies_within(&project.join("out/new/robot.zip"), &project));
        assert!(lies_within(&project.join("helpers/../robot.zip"), &project));
        assert!(!lies_within(&base.path().join("robot.zip"), &project));
        assert!(!lies_within(&project.join("../robot.zip"), &project));
        assert!(!lies_within(&project.join("x.zip"), &base.path().join("missing")));
        Ok(())
    }

    #[test]
    fn test_resolve_without_template_fails() {
        let err = PackageArgs::default().resolve(&Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::Config(_))
        ));
    }
}
