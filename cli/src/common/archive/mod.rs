//! # srdeploy Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! This module holds everything involved in producing `robot.zip`: compiling
//! the configured `ignore` patterns and merging the filtered source tree into a
//! private copy of the template archive.
//!
//! ## Architecture
//!
//! - **`ignore`**: Compiles the ordered `ignore` globs into one `IgnoreRules`
//!   matcher that tests file and directory base names.
//! - **`builder`**: `ArchiveBuilder` copies the template into a scoped
//!   temporary directory, walks the source tree (pruning ignored directories),
//!   and appends each remaining file under the `user/` prefix. The result is a
//!   `BuiltArchive` that owns the temporary directory until it is released.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::builder::ArchiveBuilder;
//!
//! let built = ArchiveBuilder::new().build(&source, &template, &cfg.ignore)?;
//! let copied = copy::copy_file_to(built.path(), &target);
//! built.release()?; // always release, whether or not the copy worked
//! copied?;
//! ```
//!

pub mod builder;
pub mod ignore;
