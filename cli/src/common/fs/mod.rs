//! # srdeploy Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the commands:
//!
//! - **`copy`**: Copies a finished archive onto its destination (a drive root or
//!   an `--output` path) without ever leaving a half-written file behind.
//! - **`io`**: Directory creation and tolerant reading of log files.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::{copy, io};
//!
//! io::ensure_dir_exists(output.parent().unwrap())?;
//! copy::copy_file_to(built.path(), &output)?;
//! let text = io::read_file_lossy(&log_path)?;
//! ```
//!

/// Copying finished archives to their destination.
pub mod copy;
/// Basic file I/O operations (`ensure_dir_exists`, `read_file_lossy`).
pub mod io;
