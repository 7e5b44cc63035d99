//! # srdeploy Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure shared by every command:
//!
//! - `config`: Configuration loading, merging, and validation
//! - `error`: The `DeployError` taxonomy and the crate-wide `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{DeployError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
