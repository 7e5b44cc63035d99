//! # srdeploy Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`: locating the
//! compiled binary and building the small fixtures (project folder, template
//! archive, config file) every test needs.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// # Get srdeploy Command (`srdeploy_cmd`)
///
/// An `assert_cmd::Command` for the `srdeploy` binary built for this test run.
pub fn srdeploy_cmd() -> Command {
    Command::cargo_bin("srdeploy").expect("Failed to find srdeploy binary for testing")
}

/// Writes `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A robot project: `.git`, `robot.py`, a helper module and some clutter.
pub fn make_project(base: &Path) -> PathBuf {
    let project = base.join("project");
    write_file(&project, "robot.py", "import sr\n");
    write_file(&project, "helpers/move.py", "def forward(): pass\n");
    write_file(&project, ".git/config", "[core]\n");
    write_file(&project, "__pycache__/a.pyc", "bytecode");
    project
}

/// A template archive holding a single `runtime/init.bin` entry.
pub fn make_template(base: &Path) -> PathBuf {
    let template = base.join("pyenv.zip");
    let mut writer = ZipWriter::new(File::create(&template).unwrap());
    writer
        .start_file("runtime/init.bin", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"\x00runtime").unwrap();
    writer.finish().unwrap();
    template
}

/// Writes a config file so tests never pick up the developer's own settings.
pub fn make_config(base: &Path, toml: &str) -> PathBuf {
    let path = base.join("srdeploy.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Entry names of a zip file, sorted.
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Contents of one zip entry.
pub fn zip_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}
