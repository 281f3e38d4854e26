//! Archive creation from a planned list of entries.
//!
//! Creation happens in two steps. [`plan_entries`] turns the walker's file
//! list and the configured extra paths into named [`ArchiveEntry`] values,
//! dropping duplicate names. [`write_archive`] streams those entries into
//! the chosen container, writing to a temporary file beside the output and
//! renaming it into place only once the archive is complete.

pub mod compression;
pub mod report;
pub mod tar;
pub mod zip;

pub use report::CreationReport;

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;
use walkdir::WalkDir;

use crate::ExportError;
use crate::ProgressCallback;
use crate::Result;
use crate::filters::GIT_DIR_NAME;
use crate::filters::is_vcs_internal;
use crate::formats::ArchiveType;

/// One file or symlink to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Absolute location of the file on disk.
    pub source: PathBuf,
    /// `/`-separated name inside the archive, prefix included.
    pub name: String,
}

/// Entries to write, in order, after duplicate names were dropped.
#[derive(Debug, Clone, Default)]
pub struct EntryPlan {
    /// Entries in the order they will be written.
    pub entries: Vec<ArchiveEntry>,
    /// Number of candidates dropped because their name was already taken.
    pub duplicates_skipped: usize,
    /// Extra paths left out because they are git metadata.
    pub warnings: Vec<String>,
}

/// Joins the archive prefix and a relative path.
///
/// # Examples
///
/// ```
/// use git_export_core::creation::entry_name;
///
/// assert_eq!(entry_name("pkg-1.0", "src/lib.rs"), "pkg-1.0/src/lib.rs");
/// assert_eq!(entry_name("", "src/lib.rs"), "src/lib.rs");
/// ```
#[must_use]
pub fn entry_name(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else {
        format!("{prefix}/{relative}")
    }
}

/// Builds the ordered, duplicate-free entry list.
///
/// Extra paths come first and are resolved against `extra_root`; a
/// directory contributes every file and symlink beneath it, in file name
/// order, skipping `.git`. Then come the walker's `files`, resolved against
/// the checkout `root`. When two candidates share an entry name the first
/// one wins.
///
/// # Errors
///
/// Returns `ExtraNotFound` if an extra path does not exist, and
/// `InvalidConfiguration` if it is not valid UTF-8.
pub fn plan_entries(
    root: &Path,
    files: &[String],
    extra_root: &Path,
    extras: &[PathBuf],
    prefix: &str,
) -> Result<EntryPlan> {
    let mut plan = EntryPlan::default();
    let mut candidates = Vec::with_capacity(files.len() + extras.len());
    for extra in extras {
        collect_extra(extra_root, extra, prefix, &mut candidates, &mut plan.warnings)?;
    }
    candidates.extend(files.iter().map(|file| ArchiveEntry {
        source: root.join(file),
        name: entry_name(prefix, file),
    }));

    let mut seen = HashSet::new();
    for candidate in candidates {
        if seen.insert(candidate.name.clone()) {
            plan.entries.push(candidate);
        } else {
            plan.duplicates_skipped += 1;
        }
    }
    Ok(plan)
}

/// Expands one extra path into candidate entries.
fn collect_extra(
    extra_root: &Path,
    extra: &Path,
    prefix: &str,
    out: &mut Vec<ArchiveEntry>,
    warnings: &mut Vec<String>,
) -> Result<()> {
    let relative = relative_name(extra)?;
    let source = extra_root.join(extra);

    let metadata = match fs::symlink_metadata(&source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ExportError::ExtraNotFound { path: source });
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        if is_vcs_internal(&relative) {
            skip_git_metadata(&relative, warnings);
        } else {
            out.push(ArchiveEntry {
                source,
                name: entry_name(prefix, &relative),
            });
        }
        return Ok(());
    }

    let mut walker = WalkDir::new(&source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(std::io::Error::from)?;
        let below = entry
            .path()
            .strip_prefix(&source)
            .map_err(|_| ExportError::invalid_config("extra path escaped its directory"))?;
        let child = relative_name(below)?;
        let name = if relative.is_empty() {
            child
        } else if child.is_empty() {
            relative.clone()
        } else {
            format!("{relative}/{child}")
        };
        if entry.file_name() == GIT_DIR_NAME {
            skip_git_metadata(&name, warnings);
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.file_type().is_dir() {
            continue;
        }
        out.push(ArchiveEntry {
            source: entry.path().to_path_buf(),
            name: entry_name(prefix, &name),
        });
    }
    Ok(())
}

fn skip_git_metadata(path: &str, warnings: &mut Vec<String>) {
    warn!(path = %path, "skipping git metadata in extra paths");
    warnings.push(format!("skipped git metadata in extra paths: {path}"));
}

/// `/`-joined normal components of a relative path; `.` segments vanish.
fn relative_name(path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| {
                ExportError::invalid_config(format!("path is not valid UTF-8: {}", path.display()))
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

/// Writes `entries` into a new archive at `output`.
///
/// The archive is assembled in a temporary file in the output's directory
/// and renamed over `output` on success. On failure the temporary file is
/// removed and any existing `output` is left untouched.
pub fn write_archive(
    output: &Path,
    format: ArchiveType,
    entries: &[ArchiveEntry],
    compression_level: Option<u8>,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".git-export-")
        .suffix(".partial")
        .tempfile_in(dir)?;

    info!(output = %output.display(), %format, entries = entries.len(), "writing archive");
    let file = temp.as_file_mut();
    let report = match format {
        ArchiveType::Tar => tar::create_tar(file, entries, progress)?,
        ArchiveType::TarGz => tar::create_tar_gz(file, entries, compression_level, progress)?,
        ArchiveType::TarBz2 => tar::create_tar_bz2(file, entries, compression_level, progress)?,
        ArchiveType::Zip => zip::create_zip(file, entries, compression_level, progress)?,
    };
    temp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o644))?;
    }

    temp.persist(output).map_err(|e| ExportError::Io(e.error))?;
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::report::NoopProgress;
    use crate::test_utils::write_file;
    use tempfile::TempDir;

    fn names(plan: &EntryPlan) -> Vec<&str> {
        plan.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_plan_prefixes_walked_files() {
        let root = Path::new("/checkout");
        let files = vec!["a.txt".to_string(), "src/b.rs".to_string()];
        let plan = plan_entries(root, &files, root, &[], "pkg").unwrap();

        assert_eq!(names(&plan), vec!["pkg/a.txt", "pkg/src/b.rs"]);
        assert_eq!(plan.entries[1].source, PathBuf::from("/checkout/src/b.rs"));
        assert_eq!(plan.duplicates_skipped, 0);
    }

    #[test]
    fn test_plan_extras_first_and_deduplicated() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "VERSION", "1.0\n");
        let root = Path::new("/checkout");
        let files = vec!["README".to_string(), "VERSION".to_string()];

        let plan = plan_entries(
            root,
            &files,
            temp.path(),
            &[PathBuf::from("./VERSION")],
            "pkg",
        )
        .unwrap();

        assert_eq!(names(&plan), vec!["pkg/VERSION", "pkg/README"]);
        assert_eq!(plan.entries[0].source, temp.path().join("./VERSION"));
        assert_eq!(plan.duplicates_skipped, 1);
    }

    #[test]
    fn test_plan_expands_extra_directories() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "gen/b.h", "");
        write_file(temp.path(), "gen/a.h", "");
        write_file(temp.path(), "gen/sub/c.h", "");
        write_file(temp.path(), "gen/.git/HEAD", "");

        let plan = plan_entries(
            Path::new("/checkout"),
            &[],
            temp.path(),
            &[PathBuf::from("gen")],
            "",
        )
        .unwrap();

        assert_eq!(names(&plan), vec!["gen/a.h", "gen/b.h", "gen/sub/c.h"]);
        assert_eq!(
            plan.warnings,
            vec!["skipped git metadata in extra paths: gen/.git"]
        );
    }

    #[test]
    fn test_plan_missing_extra() {
        let temp = TempDir::new().unwrap();
        let err = plan_entries(
            Path::new("/checkout"),
            &[],
            temp.path(),
            &[PathBuf::from("nope.txt")],
            "pkg",
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::ExtraNotFound { ref path } if path.ends_with("nope.txt")));
    }

    #[test]
    fn test_plan_skips_git_metadata_extra() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), ".git/config", "");
        let plan = plan_entries(
            Path::new("/checkout"),
            &[],
            temp.path(),
            &[PathBuf::from(".git/config")],
            "pkg",
        )
        .unwrap();
        assert!(plan.entries.is_empty());
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].ends_with(".git/config"));
    }

    #[test]
    fn test_write_archive_replaces_output_atomically() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "src/a.txt", "alpha");
        let output = temp.path().join("out.tar");
        fs::write(&output, "stale").unwrap();

        let entries = vec![ArchiveEntry {
            source: temp.path().join("src/a.txt"),
            name: "pkg/a.txt".to_string(),
        }];
        let report =
            write_archive(&output, ArchiveType::Tar, &entries, None, &mut NoopProgress).unwrap();

        assert_eq!(report.files_added, 1);
        assert!(fs::metadata(&output).unwrap().len() > 5);
        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_archive_failure_leaves_no_output() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");
        let entries = vec![ArchiveEntry {
            source: temp.path().join("missing.txt"),
            name: "missing.txt".to_string(),
        }];

        assert!(write_archive(&output, ArchiveType::Zip, &entries, None, &mut NoopProgress).is_err());
        assert!(!output.exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_archive_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.tar.gz");
        write_archive(&output, ArchiveType::TarGz, &[], Some(1), &mut NoopProgress).unwrap();
        let mode = fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
