//! # srdeploy Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges, and validates the srdeploy configuration. The
//! result is a plain `Config` value that commands pass explicitly into the
//! operations that need it; there is no process-wide settings state.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file given with `--config` / `SRDEPLOY_CONFIG` (skips discovery)
//! 2. Project-specific `.srdeploy.toml` in current directory or ancestors
//! 3. User-specific `<config dir>/srdeploy/config.toml`
//! 4. Default values defined in the code
//!
//! Recognised keys:
//!
//! ```toml
//! ignore = [".git", "*.pyc", "__pycache__"]   # globs matched against base names
//! ignore-drives = ["C:", "/media/backup"]      # volumes hidden from enumeration
//! template = "~/sr/pyenv.zip"                  # the pre-built template archive
//! mount-roots = ["/media"]                     # where the Unix enumerator looks
//! ```
//!
//! Only `ignore` (and `template`) affect the archive builder; `ignore-drives`
//! and `mount-roots` are consumed by drive enumeration.
//!
use crate::core::error::{DeployError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashSet;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// The effective configuration handed to the commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ordered glob patterns; a file or directory whose base name matches any
    /// of them is left out of the archive.
    pub ignore: Vec<String>,
    /// Volume identifiers (drive letters, mount paths, or labels) that are
    /// never offered as deployment targets.
    pub ignore_drives: Vec<String>,
    /// Path to the template archive (can use ~). Will be expanded.
    pub template: Option<String>,
    /// Directories whose children are treated as drives on Unix (can use ~).
    pub mount_roots: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ignore: Vec::new(),
            ignore_drives: Vec::new(),
            template: None,
            mount_roots: default_mount_roots(),
        }
    }
}

impl Config {
    /// The configured template archive path, if any.
    pub fn template_path(&self) -> Option<PathBuf> {
        self.template.as_ref().map(PathBuf::from)
    }

    /// The `ignore-drives` list as a set, ready for `DriveEnumerator::list`.
    pub fn ignored_drive_set(&self) -> HashSet<String> {
        self.ignore_drives.iter().cloned().collect()
    }
}

/// One configuration file as written. A key that is present, even as an
/// empty list, replaces the value from a lower-precedence file.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ConfigFile {
    ignore: Option<Vec<String>>,
    ignore_drives: Option<Vec<String>>,
    template: Option<String>,
    mount_roots: Option<Vec<String>>,
}

impl ConfigFile {
    /// Layers `over` on top of `self`; keys set in `over` win.
    fn overlay(self, over: ConfigFile) -> ConfigFile {
        ConfigFile {
            ignore: over.ignore.or(self.ignore),
            ignore_drives: over.ignore_drives.or(self.ignore_drives),
            template: over.template.or(self.template),
            mount_roots: over.mount_roots.or(self.mount_roots),
        }
    }

    fn into_config(self) -> Config {
        Config {
            ignore: self.ignore.unwrap_or_default(),
            ignore_drives: self.ignore_drives.unwrap_or_default(),
            template: self.template,
            mount_roots: self.mount_roots.unwrap_or_else(default_mount_roots),
        }
    }
}

fn default_mount_roots() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["/Volumes".to_string(), "/media".to_string()]
    } else {
        vec!["/media".to_string()]
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".srdeploy.toml";

/// Loads the effective configuration.
///
/// With `explicit` set, only that file is read (it must exist). Otherwise the
/// user and project files are discovered and merged. Paths are `~`-expanded
/// and the result is validated before it is returned.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let layers = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => {
            let user_config = load_user_config()?.unwrap_or_default();
            match load_project_config()? {
                Some(project_config) => user_config.overlay(project_config),
                None => user_config,
            }
        }
    };
    let mut config = layers.into_config();
    expand_config_paths(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<ConfigFile>> {
    if let Some(proj_dirs) = ProjectDirs::from("org", "StudentRobotics", "srdeploy") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<ConfigFile>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.srdeploy.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks from `start` towards the filesystem root looking for
/// `.srdeploy.toml`. The search stops at the first directory holding `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").exists() {
            debug!(
                "Found .git at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn expand_config_paths(config: &mut Config) {
    if let Some(template) = config.template.as_mut() {
        *template = shellexpand::tilde(template.as_str()).into_owned();
        debug!("Expanded template path: {}", template);
    }
    for root in &mut config.mount_roots {
        *root = shellexpand::tilde(root.as_str()).into_owned();
    }
}

fn validate_config(config: &Config) -> Result<()> {
    for pattern in &config.ignore {
        if pattern.trim().is_empty() {
            return Err(anyhow!(DeployError::Config(
                "'ignore' contains an empty pattern.".to_string()
            )));
        }
    }
    if let Some(template) = config.template_path() {
        if template.is_dir() {
            return Err(anyhow!(DeployError::Config(format!(
                "Configured template '{}' is a directory, expected a zip archive.",
                template.display()
            ))));
        } else if !template.exists() {
            warn!(
                "Configured template archive '{}' does not exist.",
                template.display()
            );
        }
    }
    if config.mount_roots.iter().any(|r| r.trim().is_empty()) {
        return Err(anyhow!(DeployError::Config(
            "'mount-roots' contains an empty path.".to_string()
        )));
    }
    Ok(())
}
