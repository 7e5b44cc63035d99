//! # srdeploy Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the command handlers. Commands own the
//! workflow (what to ask, what to print); everything that touches archives,
//! drives, or the filesystem lives here.
//!
//! ## Architecture
//!
//! - **`archive`**: Ignore-rule compilation and the `ArchiveBuilder` that produces `robot.zip`.
//! - **`drives`**: The `Drive` model, metadata probing, and per-platform `DriveEnumerator`s.
//! - **`fs`**: Safe copy to a destination and small I/O helpers.
//! - **`project`**: Locating the robot project folder (`.git` + `robot.py`).
//! - **`ui`**: The `Prompt` trait (`choose_one`, `notify`) and its terminal implementation.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{archive::builder::ArchiveBuilder, drives, fs::copy, project};
//! ```
//!

/// Building the deployment archive.
pub mod archive;
/// Finding drives and reading their metadata.
pub mod drives;
/// Filesystem operations (copying, I/O).
pub mod fs;
/// Locating the robot project.
pub mod project;
/// Menus and status messages.
pub mod ui;
