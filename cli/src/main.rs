//! # srdeploy Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! srdeploy packages a robot project into `robot.zip` (a pre-built template
//! archive plus the project's files under `user/`) and copies it onto a
//! removable drive for the robot controller to pick up. It can also show the
//! logs the robot leaves on that drive.
//!
//! This file handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading configuration once and routing to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Deploy the project in the current directory
//! srdeploy deploy
//!
//! # Build without deploying, with extra logging
//! srdeploy -vv build --source . --output /tmp/robot.zip
//! ```
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Subcommand handlers (build, deploy, drives, logs)
mod common; // Shared utilities (archive, drives, fs, ui, ...)
mod core; // Configuration and errors

use crate::core::config;

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "srdeploy",
    about = "Package robot code into robot.zip and deploy it to a memory stick",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Read configuration from this file instead of the user/project files.
    #[arg(long, global = true, value_name = "FILE", env = "SRDEPLOY_CONFIG")]
    config: Option<PathBuf>,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "b")]
    Build(commands::build::BuildArgs),
    #[command(alias = "d")]
    Deploy(commands::deploy::DeployArgs),
    Drives(commands::drives::DrivesArgs),
    #[command(alias = "l")]
    Logs(commands::logs::LogsArgs),
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = config::load_config(cli.config.as_deref()).and_then(|cfg| {
        match cli.command {
            Commands::Build(args) => commands::build::handle_build(args, &cfg),
            Commands::Deploy(args) => commands::deploy::handle_deploy(args, &cfg),
            Commands::Drives(args) => commands::drives::handle_drives(args, &cfg),
            Commands::Logs(args) => commands::logs::handle_logs(args, &cfg),
        }
    });

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
