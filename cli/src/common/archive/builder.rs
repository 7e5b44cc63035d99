//! # Deployment Archive Builder (`common::archive::builder`)
//!
//! File: cli/src/common/archive/builder.rs
//!
//! ## Overview
//!
//! `ArchiveBuilder` produces the `robot.zip` that gets copied onto a robot's
//! memory stick. The archive is the template archive shipped with the tooling
//! (the robot's runtime payload) with the user's source tree merged in under
//! `user/`.
//!
//! ## Architecture
//!
//! A build runs in a fixed order so that nothing is written until every input
//! has been checked:
//!
//! 1. The source directory must exist (`SourceNotFound`).
//! 2. The `ignore` patterns are compiled (`PatternCompile`).
//! 3. The template is opened and read as a zip (`TemplateUnavailable`).
//! 4. A scoped temporary directory is created and the template is copied into
//!    it byte for byte. The original template is never opened for writing.
//! 5. The source tree is walked in file-name order. Directories whose base
//!    name is ignored are pruned, so nothing beneath them is visited. Ignored
//!    files are skipped.
//! 6. Each remaining file is appended, Deflate-compressed, as
//!    `user/<relative path>` with `/` separators on every platform
//!    (`ArchiveWrite` on any failure; the whole build is abandoned).
//!
//! The finished archive is returned as a `BuiltArchive`, which owns the
//! temporary directory. The caller must `release()` it once the archive has
//! been copied to its destination. Any failure inside `build` drops the
//! directory before returning, so a failed build leaves nothing behind.
//!
//! ## Usage
//!
//! ```rust
//! let built = ArchiveBuilder::new().build(&source, &template, &[".git", "*.pyc"])?;
//! let copied = copy::copy_file_to(built.path(), &drive.join("robot.zip"));
//! built.release()?;
//! copied?;
//! ```
//!
use crate::common::archive::ignore::IgnoreRules;
use crate::core::error::{DeployError, Result};
use anyhow::Context;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, trace};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// File name of the archive inside the working directory and on the drive.
pub const ARCHIVE_NAME: &str = "robot.zip";
/// Logical directory inside the archive that holds the user's files.
pub const USER_PREFIX: &str = "user";

const TEMP_DIR_SUFFIX: &str = "-sr";

/// Builds deployment archives. Holds only where temporary directories go.
#[derive(Debug, Default, Clone)]
pub struct ArchiveBuilder {
    temp_root: Option<PathBuf>,
}

/// A finished archive inside its scoped temporary directory.
///
/// Call [`BuiltArchive::release`] after the archive has been copied. Dropping
/// an unreleased value also removes the directory, but silently.
#[derive(Debug)]
pub struct BuiltArchive {
    dir: TempDir,
    path: PathBuf,
}

impl BuiltArchive {
    /// Path of the finished `robot.zip`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The temporary directory that holds the archive.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Deletes the temporary directory and the archive inside it.
    pub fn release(self) -> Result<()> {
        let BuiltArchive { dir, path } = self;
        let dir_path = dir.path().to_path_buf();
        debug!("Releasing build directory {}", dir_path.display());
        dir.close().with_context(|| {
            format!(
                "Failed to remove temporary build directory {} (archive {})",
                dir_path.display(),
                path.display()
            )
        })
    }
}

/// One file selected for the archive: where it lives and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub name: String,
}

impl ArchiveBuilder {
    /// A builder that places working directories in the system temp dir.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that places working directories under `root` instead.
    pub fn with_temp_root(root: impl Into<PathBuf>) -> Self {
        ArchiveBuilder {
            temp_root: Some(root.into()),
        }
    }

    /// Merges the filtered contents of `source` into a copy of `template`.
    ///
    /// # Arguments
    ///
    /// * `source` - The user's project directory.
    /// * `template` - The pre-built template archive. Read, never written.
    /// * `patterns` - `ignore` globs, matched against base names.
    ///
    /// # Returns
    ///
    /// * `Result<BuiltArchive>` - The finished archive. The caller must release it.
    ///
    /// # Errors
    ///
    /// `SourceNotFound`, `PatternCompile`, `TemplateUnavailable` or
    /// `ArchiveWrite` (all `DeployError`), checked in that order.
    pub fn build<S: AsRef<str>>(
        &self,
        source: &Path,
        template: &Path,
        patterns: &[S],
    ) -> Result<BuiltArchive> {
        info!(
            "Building {} from {} with template {}",
            ARCHIVE_NAME,
            source.display(),
            template.display()
        );

        if !source.is_dir() || fs::read_dir(source).is_err() {
            return Err(DeployError::SourceNotFound {
                path: source.to_path_buf(),
            }
            .into());
        }
        let rules = IgnoreRules::compile(patterns)?;
        if rules.is_empty() {
            debug!("No ignore patterns, packaging every file");
        }
        let template_names = read_template_names(template)?;

        let dir = self.create_temp_dir()?;
        let path = dir.path().join(ARCHIVE_NAME);
        copy_template(template, &path)?;
        debug!("Copied template into {}", path.display());

        let entries = collect_source_entries(source, &rules)?;
        append_entries(&path, &entries, &template_names)?;

        info!(
            "Built {} with {} template entr(ies) and {} user file(s)",
            path.display(),
            template_names.len(),
            entries.len()
        );
        Ok(BuiltArchive { dir, path })
    }

    fn create_temp_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("srdeploy-").suffix(TEMP_DIR_SUFFIX);
        let created = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        created.map_err(|e| {
            DeployError::FileSystem(format!("Failed to create temporary build directory: {e}"))
                .into()
        })
    }
}

/// Opens `template` as a zip and returns the names of its entries.
fn read_template_names(template: &Path) -> Result<HashSet<String>> {
    let unavailable = |reason: String| DeployError::TemplateUnavailable {
        path: template.to_path_buf(),
        reason,
    };
    let file = File::open(template).map_err(|e| unavailable(e.to_string()))?;
    let archive = ZipArchive::new(file).map_err(|e| unavailable(e.to_string()))?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Copies the template's bytes into a new working file.
///
/// Only the contents are copied. The working file gets default permissions,
/// so a read-only template still yields an archive that can be appended to.
fn copy_template(template: &Path, working: &Path) -> Result<u64> {
    let unavailable = |e: io::Error| DeployError::TemplateUnavailable {
        path: template.to_path_buf(),
        reason: format!("copy failed: {e}"),
    };
    let mut input = File::open(template).map_err(unavailable)?;
    let mut output = File::create(working).map_err(|e| {
        DeployError::ArchiveWrite(format!("cannot create {}: {e}", working.display()))
    })?;
    let bytes = io::copy(&mut input, &mut output).map_err(unavailable)?;
    Ok(bytes)
}

/// Walks `source` in file-name order and returns the files to archive.
///
/// Ignored directories are pruned with `filter_entry`, so their contents are
/// never read. The root itself is never tested against the rules.
pub fn collect_source_entries(source: &Path, rules: &IgnoreRules) -> Result<Vec<SourceEntry>> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let keep = e.depth() == 0 || !rules.is_ignored(e.file_name());
            if !keep {
                debug!("Ignoring {}", e.path().display());
            }
            keep
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            DeployError::ArchiveWrite(format!("Failed to read source tree: {e}"))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        // Symlinks are included when they resolve to a regular file.
        if !entry.file_type().is_file() && !entry.path().is_file() {
            trace!("Skipping non-regular file {}", entry.path().display());
            continue;
        }
        let relative = entry.path().strip_prefix(source).map_err(|e| {
            DeployError::ArchiveWrite(format!(
                "Path {} is outside {}: {e}",
                entry.path().display(),
                source.display()
            ))
        })?;
        entries.push(SourceEntry {
            path: entry.path().to_path_buf(),
            name: logical_name(relative)?,
        });
    }
    Ok(entries)
}

/// `user/<relative>` with `/` separators, whatever the host uses.
///
/// # Errors
///
/// `ArchiveWrite` if a component is not valid UTF-8. Such a name would have
/// to be altered to fit in the archive.
pub fn logical_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component.as_os_str().to_str().ok_or_else(|| {
            DeployError::ArchiveWrite(format!(
                "file name '{}' is not valid UTF-8",
                relative.display()
            ))
        })?;
        parts.push(part);
    }
    Ok(format!("{}/{}", USER_PREFIX, parts.join("/")))
}

fn append_entries(
    archive_path: &Path,
    entries: &[SourceEntry],
    template_names: &HashSet<String>,
) -> Result<()> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(archive_path)
        .map_err(|e| {
            DeployError::ArchiveWrite(format!("cannot open {}: {e}", archive_path.display()))
        })?;
    let mut writer = ZipWriter::new_append(file)
        .map_err(|e| DeployError::ArchiveWrite(format!("cannot append: {e}")))?;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        if template_names.contains(&entry.name) {
            return Err(DeployError::ArchiveWrite(format!(
                "'{}' already exists in the template archive",
                entry.name
            ))
            .into());
        }
        trace!("Adding {} as {}", entry.path.display(), entry.name);
        writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e| DeployError::ArchiveWrite(format!("cannot add '{}': {e}", entry.name)))?;
        let mut input = File::open(&entry.path).map_err(|e| {
            DeployError::ArchiveWrite(format!("cannot read {}: {e}", entry.path.display()))
        })?;
        io::copy(&mut input, &mut writer)
            .map_err(|e| DeployError::ArchiveWrite(format!("cannot write '{}': {e}", entry.name)))?;
    }

    writer
        .finish()
        .map_err(|e| DeployError::ArchiveWrite(format!("cannot finish archive: {e}")))?;
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    fn write_template(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    fn names(path: &Path) -> Vec<String> {
        read_entries(path).into_iter().map(|(n, _)| n).collect()
    }

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Source tree and template from the robot deployment scenario.
    fn robot_fixture(base: &Path) -> (PathBuf, PathBuf) {
        let source = base.join("project");
        write_file(&source, "robot.py", "import sr\n");
        write_file(&source, "helpers/move.py", "def forward(): pass\n");
        write_file(&source, ".git/config", "[core]\n");
        write_file(&source, "__pycache__/a.pyc", "bytecode");
        let template = base.join("template.zip");
        write_template(&template, &[("runtime/init.bin", b"\x00\x01runtime")]);
        (source, template)
    }

    fn is_empty_dir(path: &Path) -> bool {
        fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_build_robot_scenario() -> Result<()> {
        let base = tempdir()?;
        let (source, template) = robot_fixture(base.path());

        let built = ArchiveBuilder::new().build(
            &source,
            &template,
            &[".git", "*.pyc", "__pycache__"],
        )?;

        assert_eq!(
            names(built.path()),
            vec!["runtime/init.bin", "user/helpers/move.py", "user/robot.py"]
        );
        assert_eq!(built.path().file_name().unwrap(), ARCHIVE_NAME);
        built.release()?;
        Ok(())
    }

    #[test]
    fn test_build_empty_patterns_includes_everything() -> Result<()> {
        let base = tempdir()?;
        let (source, template) = robot_fixture(base.path());

        let built = ArchiveBuilder::new().build::<&str>(&source, &template, &[])?;

        let all = names(built.path());
        assert_eq!(
            all,
            vec![
                "runtime/init.bin",
                "user/.git/config",
                "user/__pycache__/a.pyc",
                "user/helpers/move.py",
                "user/robot.py",
            ]
        );
        built.release()?;
        Ok(())
    }

    #[test]
    fn test_ignored_directory_is_pruned() -> Result<()> {
        let base = tempdir()?;
        let source = base.path().join("src");
        write_file(&source, "build/keep_me.py", "x");
        write_file(&source, "build/deeper/also.py", "y");
        write_file(&source, "lib/build/nested.py", "z");
        write_file(&source, "lib/ok.py", "ok");
        let rules = IgnoreRules::compile(&["build"])?;

        let entries = collect_source_entries(&source, &rules)?;

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["user/lib/ok.py"]);
        Ok(())
    }

    #[test]
    fn test_file_pattern_does_not_hide_matching_directory_contents_elsewhere() -> Result<()> {
        let base = tempdir()?;
        let source = base.path().join("src");
        write_file(&source, "notes.txt", "n");
        write_file(&source, "docs/readme.md", "r");
        let rules = IgnoreRules::compile(&["*.txt"])?;

        let entries = collect_source_entries(&source, &rules)?;

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["user/docs/readme.md"]);
        Ok(())
    }

    #[test]
    fn test_template_entries_unchanged_and_template_untouched() -> Result<()> {
        let base = tempdir()?;
        let source = base.path().join("src");
        write_file(&source, "robot.py", "print('hi')");
        let template = base.path().join("template.zip");
        write_template(
            &template,
            &[
                ("runtime/init.bin", b"\x00\x01\x02"),
                ("runtime/lib/sr.py", b"class Robot: pass\n"),
            ],
        );
        let before = fs::read(&template)?;
        let original = read_entries(&template);

        let built = ArchiveBuilder::new().build::<&str>(&source, &template, &[])?;

        assert_eq!(fs::read(&template)?, before);
        let merged: BTreeMap<String, Vec<u8>> = read_entries(built.path()).into_iter().collect();
        for (name, data) in original {
            assert_eq!(merged.get(&name), Some(&data), "entry {name} changed");
        }
        assert_eq!(merged.get("user/robot.py").map(Vec::as_slice), Some(&b"print('hi')"[..]));
        built.release()?;
        Ok(())
    }

    #[test]
    fn test_build_is_repeatable() -> Result<()> {
        let base = tempdir()?;
        let (source, template) = robot_fixture(base.path());
        let builder = ArchiveBuilder::new();
        let patterns = ["*.pyc"];

        let first = builder.build(&source, &template, &patterns)?;
        let second = builder.build(&source, &template, &patterns)?;

        assert_ne!(first.dir(), second.dir());
        assert_eq!(read_entries(first.path()), read_entries(second.path()));
        first.release()?;
        second.release()?;
        Ok(())
    }

    #[test]
    fn test_release_removes_temp_dir() -> Result<()> {
        let base = tempdir()?;
        let (source, template) = robot_fixture(base.path());
        let temp_root = base.path().join("tmp");
        fs::create_dir(&temp_root)?;

        let built = ArchiveBuilder::with_temp_root(&temp_root).build::<&str>(&source, &template, &[])?;
        let dir = built.dir().to_path_buf();
        assert!(dir.starts_with(&temp_root));
        assert!(dir.to_string_lossy().ends_with(TEMP_DIR_SUFFIX));
        assert!(built.path().is_file());

        built.release()?;
        assert!(!dir.exists());
        assert!(is_empty_dir(&temp_root));
        Ok(())
    }

    #[test]
    fn test_drop_removes_temp_dir() -> Result<()> {
        let base = tempdir()?;
        let (source, template) = robot_fixture(base.path());
        let temp_root = base.path().join("tmp");
        fs::create_dir(&temp_root)?;

        let dir = {
            let built =
                ArchiveBuilder::with_temp_root(&temp_root).build::<&str>(&source, &template, &[])?;
            built.dir().to_path_buf()
        };
        assert!(!dir.exists());
        Ok(())
    }

    #[test]
    fn test_missing_source_fails_without_temp_dir() -> Result<()> {
        let base = tempdir()?;
        let (_, template) = robot_fixture(base.path());
        let temp_root = base.path().join("tmp");
        fs::create_dir(&temp_root)?;

        let err = ArchiveBuilder::with_temp_root(&temp_root)
            .build::<&str>(&base.path().join("missing"), &template, &[])
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::SourceNotFound { .. })
        ));
        assert!(is_empty_dir(&temp_root));
        Ok(())
    }

    #[test]
    fn test_missing_or_corrupt_template() -> Result<()> {
        let base = tempdir()?;
        let (source, _) = robot_fixture(base.path());
        let temp_root = base.path().join("tmp");
        fs::create_dir(&temp_root)?;
        let builder = ArchiveBuilder::with_temp_root(&temp_root);

        let missing = builder
            .build::<&str>(&source, &base.path().join("nope.zip"), &[])
            .unwrap_err();
        assert!(matches!(
            missing.downcast_ref::<DeployError>(),
            Some(DeployError::TemplateUnavailable { .. })
        ));

        let corrupt = base.path().join("corrupt.zip");
        fs::write(&corrupt, b"this is not a zip file")?;
        let err = builder.build::<&str>(&source, &corrupt, &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::TemplateUnavailable { .. })
        ));
        assert!(is_empty_dir(&temp_root));
        Ok(())
    }

    #[test]
    fn test_bad_pattern_fails_before_temp_dir() -> Result<()> {
        let base = tempdir()?;
        let (source, template) = robot_fixture(base.path());
        let temp_root = base.path().join("tmp");
        fs::create_dir(&temp_root)?;

        let err = ArchiveBuilder::with_temp_root(&temp_root)
            .build(&source, &template, &["*.pyc", "[oops"])
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::PatternCompile { .. })
        ));
        assert!(is_empty_dir(&temp_root));
        Ok(())
    }

    #[test]
    fn test_name_clash_with_template_aborts_build() -> Result<()> {
        let base = tempdir()?;
        let source = base.path().join("src");
        write_file(&source, "robot.py", "mine");
        let template = base.path().join("template.zip");
        write_template(&template, &[("user/robot.py", b"theirs")]);
        let temp_root = base.path().join("tmp");
        fs::create_dir(&temp_root)?;

        let err = ArchiveBuilder::with_temp_root(&temp_root)
            .build::<&str>(&source, &template, &[])
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::ArchiveWrite(_))
        ));
        assert!(is_empty_dir(&temp_root));
        Ok(())
    }

    #[test]
    fn test_logical_name_uses_forward_slashes() -> Result<()> {
        let relative: PathBuf = ["helpers", "motion", "move.py"].iter().collect();
        assert_eq!(logical_name(&relative)?, "user/helpers/motion/move.py");
        assert_eq!(logical_name(Path::new("robot.py"))?, "user/robot.py");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_logical_name_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let relative = Path::new("helpers").join(OsStr::from_bytes(b"mo\xffve.py"));
        let err = logical_name(&relative).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::ArchiveWrite(_))
        ));
    }

    #[test]
    #[allow(clippy::permissions_set_readonly_false)]
    fn test_read_only_template_gives_writable_working_copy() -> Result<()> {
        let base = tempdir()?;
        let (source, template) = robot_fixture(base.path());
        let original = fs::read(&template)?;
        let mut perms = fs::metadata(&template)?.permissions();
        perms.set_readonly(true);
        fs::set_permissions(&template, perms)?;

        let built = ArchiveBuilder::with_temp_root(base.path()).build(&source, &template, &[".git"])?;

        assert!(!fs::metadata(built.path())?.permissions().readonly());
        assert!(names(built.path()).contains(&"user/robot.py".to_string()));
        assert!(fs::metadata(&template)?.permissions().readonly());
        assert_eq!(fs::read(&template)?, original);
        built.release()?;

        // Windows refuses to delete read-only files.
        let mut perms = fs::metadata(&template)?.permissions();
        perms.set_readonly(false);
        fs::set_permissions(&template, perms)?;
        Ok(())
    }
}
