//! ZIP archive creation.

use std::fs;
use std::fs::File;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ProgressCallback;
use crate::Result;
use crate::creation::ArchiveEntry;
use crate::creation::compression::compression_level_to_zip;
use crate::creation::report::CreationReport;
use crate::io::CountingWriter;
use crate::io::ProgressReader;

/// Writes a deflate-compressed ZIP archive of `entries` to `writer`.
///
/// Symlinks are stored as ZIP symlink entries, and on unix every entry
/// carries the source file's permission bits.
///
/// # Examples
///
/// ```no_run
/// use git_export_core::NoopProgress;
/// use git_export_core::creation::ArchiveEntry;
/// use git_export_core::creation::zip::create_zip;
/// use std::fs::File;
///
/// let entries = vec![ArchiveEntry {
///     source: "README.md".into(),
///     name: "project/README.md".to_string(),
/// }];
/// let report = create_zip(File::create("project.zip")?, &entries, Some(9), &mut NoopProgress)?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), git_export_core::ExportError>(())
/// ```
pub fn create_zip<W: Write + Seek>(
    writer: W,
    entries: &[ArchiveEntry],
    compression_level: Option<u8>,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let start = Instant::now();
    let mut zip = ZipWriter::new(writer);
    let mut report = CreationReport::default();
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(compression_level_to_zip(compression_level));
    let total = entries.len();

    for (idx, entry) in entries.iter().enumerate() {
        let name = Path::new(&entry.name);
        progress.on_entry_start(name, total, idx + 1);
        append_entry(&mut zip, entry, options, &mut report, progress)?;
        progress.on_entry_complete(name);
    }

    let mut writer = zip.finish()?;
    let end = writer.stream_position()?;

    report.bytes_compressed = end;
    report.duration = start.elapsed();
    progress.on_complete();

    Ok(report)
}

fn append_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &ArchiveEntry,
    options: SimpleFileOptions,
    report: &mut CreationReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let metadata = fs::symlink_metadata(&entry.source)?;
    let options = with_permissions(options, &metadata);

    if metadata.file_type().is_symlink() {
        let target = fs::read_link(&entry.source)?;
        let target = normalize_zip_path(&target)?;
        zip.add_symlink(entry.name.as_str(), target.as_str(), options)?;
        report.symlinks_added += 1;
        return Ok(());
    }

    let file = File::open(&entry.source)?;
    let options = options.large_file(needs_zip64(metadata.len()));
    zip.start_file(entry.name.as_str(), options)?;
    let mut reader = ProgressReader::new(file, progress);
    let mut sink = CountingWriter::new(&mut *zip);
    std::io::copy(&mut reader, &mut sink)?;

    report.files_added += 1;
    report.bytes_written += sink.total_bytes();
    Ok(())
}

/// Sizes that no longer fit the 32-bit fields of a plain ZIP header.
fn needs_zip64(size: u64) -> bool {
    size >= u64::from(u32::MAX)
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, metadata: &fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _metadata: &fs::Metadata) -> SimpleFileOptions {
    options
}

/// Converts a path to ZIP form (forward slashes).
fn normalize_zip_path(path: &Path) -> Result<String> {
    let path_str = path.to_str().ok_or_else(|| {
        crate::ExportError::invalid_config(format!("path is not valid UTF-8: {}", path.display()))
    })?;

    #[cfg(windows)]
    let normalized = path_str.replace('\\', "/");

    #[cfg(not(windows))]
    let normalized = path_str.to_string();

    Ok(normalized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::report::NoopProgress;
    use crate::test_utils::write_file;
    use std::io::Cursor;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_needs_zip64_at_four_gibibytes() {
        assert!(!needs_zip64(0));
        assert!(!needs_zip64(u64::from(u32::MAX) - 1));
        assert!(needs_zip64(u64::from(u32::MAX)));
        assert!(needs_zip64(5 * 1024 * 1024 * 1024));
    }

    fn entry(root: &Path, rel: &str, name: &str) -> ArchiveEntry {
        ArchiveEntry {
            source: root.join(rel),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_create_zip_contents() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a.txt", "alpha");
        write_file(temp.path(), "src/b.rs", "fn main() {}");
        let entries = vec![
            entry(temp.path(), "a.txt", "pkg/a.txt"),
            entry(temp.path(), "src/b.rs", "pkg/src/b.rs"),
        ];

        let mut cursor = Cursor::new(Vec::new());
        let report = create_zip(&mut cursor, &entries, None, &mut NoopProgress).unwrap();
        assert_eq!(report.files_added, 2);
        assert_eq!(report.bytes_written, 17);
        assert_eq!(report.bytes_compressed, cursor.get_ref().len() as u64);

        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        assert_eq!(archive.len(), 2);
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"pkg/a.txt".to_string()));
        assert!(names.contains(&"pkg/src/b.rs".to_string()));

        let mut content = String::new();
        archive
            .by_name("pkg/a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "alpha");
        for i in 0..archive.len() {
            assert!(!archive.by_index(i).unwrap().is_dir());
        }
    }

    #[test]
    fn test_create_zip_compresses() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "big.txt", &"z".repeat(10_000));
        let entries = vec![entry(temp.path(), "big.txt", "big.txt")];

        let mut cursor = Cursor::new(Vec::new());
        let report = create_zip(&mut cursor, &entries, Some(9), &mut NoopProgress).unwrap();
        assert!(report.bytes_compressed < report.bytes_written);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_stored_as_link() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "target.txt", "t");
        std::os::unix::fs::symlink("target.txt", temp.path().join("link")).unwrap();
        let entries = vec![entry(temp.path(), "link", "pkg/link")];

        let mut cursor = Cursor::new(Vec::new());
        let report = create_zip(&mut cursor, &entries, None, &mut NoopProgress).unwrap();
        assert_eq!(report.symlinks_added, 1);

        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        let mut link = archive.by_name("pkg/link").unwrap();
        assert_eq!(link.unix_mode().unwrap() & 0o170_000, 0o120_000);
        let mut target = String::new();
        link.read_to_string(&mut target).unwrap();
        assert_eq!(target, "target.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "tool", "#!/bin/sh\n");
        fs::set_permissions(temp.path().join("tool"), fs::Permissions::from_mode(0o755)).unwrap();
        let entries = vec![entry(temp.path(), "tool", "tool")];

        let mut cursor = Cursor::new(Vec::new());
        create_zip(&mut cursor, &entries, None, &mut NoopProgress).unwrap();

        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        let file = archive.by_name("tool").unwrap();
        assert_eq!(file.unix_mode().unwrap() & 0o777, 0o755);
    }

    #[test]
    fn test_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let entries = vec![entry(temp.path(), "gone", "gone")];
        let mut cursor = Cursor::new(Vec::new());
        assert!(create_zip(&mut cursor, &entries, None, &mut NoopProgress).is_err());
    }
}
