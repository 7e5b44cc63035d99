//! # srdeploy Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per subcommand. Each defines its Clap arguments struct and a
//! `handle_*` function that receives the parsed arguments and the loaded
//! `Config`:
//!
//! - `build`: Package a project into `robot.zip` at a chosen path
//! - `deploy`: Package a project and copy it onto a memory stick
//! - `drives`: List detected drives and their status
//! - `logs`: Show the robot's log files from a drive
//!

/// `srdeploy build` and the packaging options shared with `deploy`.
pub mod build;
/// `srdeploy deploy`, the build-and-copy workflow.
pub mod deploy;
/// `srdeploy drives`.
pub mod drives;
/// `srdeploy logs`.
pub mod logs;
