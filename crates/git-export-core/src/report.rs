//! Progress reporting for archive writing.

use std::path::Path;

/// Callback trait for progress reporting while entries are written.
///
/// Implement this trait to receive progress updates, for example to drive a
/// progress bar.
///
/// # Examples
///
/// ```
/// use git_export_core::ProgressCallback;
/// use std::path::Path;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("Adding {}/{}: {}", current, total, path.display());
///     }
///
///     fn on_bytes_written(&mut self, bytes: u64) {}
///
///     fn on_entry_complete(&mut self, path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("Archive written");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is added.
    ///
    /// # Arguments
    ///
    /// * `path` - Entry name inside the archive
    /// * `total` - Total number of entries to write
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called as file contents are copied into the archive.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Number of uncompressed bytes copied in this update
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been completely written.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the archive is finalized.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
