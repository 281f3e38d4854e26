//! TAR archive creation, plain or compressed with gzip or bzip2.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tar::Builder;
use tar::Header;

use crate::ProgressCallback;
use crate::Result;
use crate::creation::ArchiveEntry;
use crate::creation::compression::compression_level_to_bzip2;
use crate::creation::compression::compression_level_to_flate2;
use crate::creation::report::CreationReport;
use crate::io::CountingWriter;
use crate::io::ProgressReader;

/// Writes an uncompressed TAR archive of `entries` to `writer`.
///
/// # Examples
///
/// ```no_run
/// use git_export_core::NoopProgress;
/// use git_export_core::creation::ArchiveEntry;
/// use git_export_core::creation::tar::create_tar;
/// use std::fs::File;
///
/// let entries = vec![ArchiveEntry {
///     source: "README.md".into(),
///     name: "project/README.md".to_string(),
/// }];
/// let report = create_tar(File::create("project.tar")?, &entries, &mut NoopProgress)?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), git_export_core::ExportError>(())
/// ```
pub fn create_tar<W: Write>(
    writer: W,
    entries: &[ArchiveEntry],
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    write_tar(CountingWriter::new(writer), entries, progress, Ok)
}

/// Writes a gzip-compressed TAR archive (.tar.gz) of `entries` to `writer`.
pub fn create_tar_gz<W: Write>(
    writer: W,
    entries: &[ArchiveEntry],
    compression_level: Option<u8>,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let level = compression_level_to_flate2(compression_level);
    let encoder = flate2::write::GzEncoder::new(CountingWriter::new(writer), level);
    write_tar(encoder, entries, progress, flate2::write::GzEncoder::finish)
}

/// Writes a bzip2-compressed TAR archive (.tar.bz2) of `entries` to
/// `writer`.
pub fn create_tar_bz2<W: Write>(
    writer: W,
    entries: &[ArchiveEntry],
    compression_level: Option<u8>,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let level = compression_level_to_bzip2(compression_level);
    let encoder = bzip2::write::BzEncoder::new(CountingWriter::new(writer), level);
    write_tar(encoder, entries, progress, bzip2::write::BzEncoder::finish)
}

/// Streams entries through `encoder`, then finishes it to recover the
/// counting writer underneath.
fn write_tar<E, W, F>(
    encoder: E,
    entries: &[ArchiveEntry],
    progress: &mut dyn ProgressCallback,
    finish: F,
) -> Result<CreationReport>
where
    E: Write,
    W: Write,
    F: FnOnce(E) -> std::io::Result<CountingWriter<W>>,
{
    let start = Instant::now();
    let mut builder = Builder::new(encoder);
    let mut report = CreationReport::default();
    let total = entries.len();

    for (idx, entry) in entries.iter().enumerate() {
        let name = Path::new(&entry.name);
        progress.on_entry_start(name, total, idx + 1);
        append_entry(&mut builder, entry, &mut report, progress)?;
        progress.on_entry_complete(name);
    }

    builder.finish()?;
    let mut counting = finish(builder.into_inner()?)?;
    counting.flush()?;

    report.bytes_compressed = counting.total_bytes();
    report.duration = start.elapsed();
    progress.on_complete();

    Ok(report)
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    entry: &ArchiveEntry,
    report: &mut CreationReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let metadata = fs::symlink_metadata(&entry.source)?;

    if metadata.file_type().is_symlink() {
        let target = fs::read_link(&entry.source)?;
        let mut header = Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        set_permissions(&mut header, &metadata);
        builder.append_link(&mut header, &entry.name, &target)?;
        report.symlinks_added += 1;
        return Ok(());
    }

    let file = File::open(&entry.source)?;
    let size = metadata.len();
    let mut header = Header::new_gnu();
    header.set_size(size);
    set_permissions(&mut header, &metadata);
    header.set_cksum();

    let mut reader = ProgressReader::new(file, progress);
    builder.append_data(&mut header, &entry.name, &mut reader)?;

    report.files_added += 1;
    report.bytes_written += size;
    Ok(())
}

/// Copies mode, owner and mtime from the checkout into the header.
#[cfg(unix)]
fn set_permissions(header: &mut Header, metadata: &fs::Metadata) {
    use std::os::unix::fs::MetadataExt;
    header.set_mode(metadata.mode());
    header.set_uid(u64::from(metadata.uid()));
    header.set_gid(u64::from(metadata.gid()));
    // mtime can be negative for dates before epoch, clamp to 0
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_permissions(header: &mut Header, metadata: &fs::Metadata) {
    let mode = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    header.set_mode(mode);

    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}
