//! Archive creation reporting.

use std::time::Duration;

/// Statistics about one written archive.
///
/// # Examples
///
/// ```
/// use git_export_core::creation::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Number of regular files added.
    pub files_added: usize,

    /// Number of symlinks added.
    pub symlinks_added: usize,

    /// Total uncompressed bytes of file contents.
    pub bytes_written: u64,

    /// Size of the finished archive.
    pub bytes_compressed: u64,

    /// Time spent writing the archive.
    pub duration: Duration,
}

impl CreationReport {
    /// Creates a new empty creation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either size is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the share of space saved, in percent.
    ///
    /// Returns 0.0 if nothing was written and never goes below 0.0, since
    /// container overhead can make small archives larger than their input.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }

    /// Returns total number of entries added.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_added + self.symlinks_added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_report_default() {
        let report = CreationReport::new();
        assert_eq!(report.files_added, 0);
        assert_eq!(report.symlinks_added, 0);
        assert_eq!(report.duration, Duration::default());
        assert_eq!(report.total_items(), 0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_compression_figures() {
        let mut report = CreationReport::new();
        assert_eq!(report.compression_ratio(), 0.0);
        assert_eq!(report.compression_percentage(), 0.0);

        report.bytes_written = 1000;
        report.bytes_compressed = 250;
        assert_eq!(report.compression_ratio(), 4.0);
        assert_eq!(report.compression_percentage(), 75.0);

        // Tar padding can exceed the input size
        report.bytes_compressed = 10_240;
        assert_eq!(report.compression_percentage(), 0.0);
    }

    #[test]
    fn test_total_items() {
        let report = CreationReport {
            files_added: 4,
            symlinks_added: 2,
            ..CreationReport::default()
        };
        assert_eq!(report.total_items(), 6);
    }
}
