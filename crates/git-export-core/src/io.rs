//! I/O adapters used while writing archives.

use std::io::Read;
use std::io::Write;

use crate::ProgressCallback;

/// Writer that counts the bytes passed through to its inner writer.
///
/// Placed between a compressor and the output file it measures the final
/// archive size.
///
/// # Examples
///
/// ```
/// use git_export_core::io::CountingWriter;
/// use std::io::Write;
///
/// let mut writer = CountingWriter::new(Vec::new());
/// writer.write_all(b"hello")?;
/// assert_eq!(writer.total_bytes(), 5);
/// assert_eq!(writer.into_inner(), b"hello");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Wraps `inner` with a zeroed counter.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Total bytes successfully written so far.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Unwraps the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Batch size for byte-count updates.
const PROGRESS_BATCH: u64 = 1024 * 1024;

/// Reader that reports bytes read to a [`ProgressCallback`].
///
/// Updates are batched to one callback per megabyte; the remainder is
/// flushed on drop.
pub struct ProgressReader<'a, R> {
    inner: R,
    progress: &'a mut dyn ProgressCallback,
    pending: u64,
}

impl<'a, R> ProgressReader<'a, R> {
    /// Wraps `inner`, reporting to `progress`.
    pub fn new(inner: R, progress: &'a mut dyn ProgressCallback) -> Self {
        Self {
            inner,
            progress,
            pending: 0,
        }
    }

    fn flush_progress(&mut self) {
        if self.pending > 0 {
            self.progress.on_bytes_written(self.pending);
            self.pending = 0;
        }
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let bytes_read = self.inner.read(buf)?;
        self.pending += bytes_read as u64;
        if self.pending >= PROGRESS_BATCH {
            self.flush_progress();
        }
        Ok(bytes_read)
    }
}

impl<R> Drop for ProgressReader<'_, R> {
    fn drop(&mut self) {
        self.flush_progress();
    }
}
