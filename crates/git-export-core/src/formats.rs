//! Archive format detection and default prefix derivation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::ExportError;
use crate::Result;

/// Recognized output name suffixes, longest first so `.tar.gz` wins over
/// `.gz`.
const SUFFIXES: &[(&str, ArchiveType)] = &[
    (".tar.bz2", ArchiveType::TarBz2),
    (".tar.gz", ArchiveType::TarGz),
    (".tbz2", ArchiveType::TarBz2),
    (".tbz", ArchiveType::TarBz2),
    (".tgz", ArchiveType::TarGz),
    (".bz2", ArchiveType::TarBz2),
    (".tar", ArchiveType::Tar),
    (".zip", ArchiveType::Zip),
    (".gz", ArchiveType::TarGz),
];

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// ZIP archive.
    Zip,
}

impl ArchiveType {
    /// Canonical file extension for this format, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveType {
    type Err = ExportError;

    /// Parses an explicit format name such as `zip`, `tar`, `tgz` or
    /// `tar.bz2`. Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tar" => Ok(Self::Tar),
            "tar.gz" | "tgz" | "gz" => Ok(Self::TarGz),
            "tar.bz2" | "tbz2" | "tbz" | "bz2" => Ok(Self::TarBz2),
            "zip" => Ok(Self::Zip),
            _ => Err(ExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Detects the archive type from an output file name.
///
/// # Errors
///
/// Returns `UnsupportedFormat` if the name carries no recognized extension.
///
/// # Examples
///
/// ```
/// use git_export_core::formats::ArchiveType;
/// use git_export_core::formats::detect_format;
/// use std::path::Path;
///
/// assert_eq!(detect_format(Path::new("release.tar.gz"))?, ArchiveType::TarGz);
/// assert_eq!(detect_format(Path::new("release.zip"))?, ArchiveType::Zip);
/// assert!(detect_format(Path::new("release.rar")).is_err());
/// # Ok::<(), git_export_core::ExportError>(())
/// ```
pub fn detect_format(path: &Path) -> Result<ArchiveType> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExportError::UnsupportedFormat {
            format: path.display().to_string(),
        })?
        .to_ascii_lowercase();

    SUFFIXES
        .iter()
        .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
        .map(|&(_, format)| format)
        .ok_or_else(|| ExportError::UnsupportedFormat {
            format: path.display().to_string(),
        })
}

/// Strips a recognized archive extension from a file name.
///
/// Names without a recognized extension are returned unchanged, so
/// `release-1.0` keeps its `.0`.
///
/// # Examples
///
/// ```
/// use git_export_core::formats::strip_archive_extension;
///
/// assert_eq!(strip_archive_extension("foo.tar.gz"), "foo");
/// assert_eq!(strip_archive_extension("foo-1.2.TGZ"), "foo-1.2");
/// assert_eq!(strip_archive_extension("foo-1.2"), "foo-1.2");
/// ```
#[must_use]
pub fn strip_archive_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.len() > suffix.len() && lower.ends_with(suffix))
        .map_or(name, |(suffix, _)| &name[..name.len() - suffix.len()])
}

/// Derives the default entry prefix from the output path.
///
/// The prefix is the output's base name without its archive extension, so
/// extracting `foo.tar.gz` produces a single `foo/` directory instead of
/// scattering files into the current directory.
///
/// # Examples
///
/// ```
/// use git_export_core::formats::default_prefix;
/// use std::path::Path;
///
/// assert_eq!(default_prefix(Path::new("dist/foo.tar.gz")), Some("foo".to_string()));
/// assert_eq!(default_prefix(Path::new("/")), None);
/// ```
#[must_use]
pub fn default_prefix(output: &Path) -> Option<String> {
    let name = output.file_name()?.to_str()?;
    let stem = strip_archive_extension(name);
    (!stem.is_empty()).then(|| stem.to_string())
}
