//! Configuration for repository export operations.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExportError;
use crate::Result;
use crate::formats::ArchiveType;
use crate::formats::default_prefix;
use crate::formats::detect_format;

/// Settings for one export run.
///
/// # Examples
///
/// ```
/// use git_export_core::ExportConfig;
///
/// let config = ExportConfig::default()
///     .with_source("path/to/repo")
///     .with_revision("v1.2.0")
///     .with_prefix("project-1.2.0")
///     .with_extra("build/generated.h");
///
/// assert!(config.use_attributes);
/// assert_eq!(config.revision, "v1.2.0");
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory all archive entries are placed under.
    ///
    /// `None` derives it from the output file name with its archive
    /// extension removed. An empty string places entries at the archive
    /// root.
    ///
    /// Default: `None`.
    pub prefix: Option<String>,

    /// Log each step of the export.
    ///
    /// Default: `false`.
    pub verbose: bool,

    /// Honor `export-ignore` from gitattributes files.
    ///
    /// Default: `true`.
    pub use_attributes: bool,

    /// Run `git submodule init` and `git submodule update` in every
    /// repository before listing it.
    ///
    /// Default: `false`.
    pub force_submodules: bool,

    /// Paths added to the archive regardless of tracking or exclusion.
    ///
    /// Relative to the source repository root. Directories are added with
    /// everything beneath them.
    ///
    /// Default: empty.
    pub extra: Vec<PathBuf>,

    /// Any path inside the repository to export.
    ///
    /// Default: `.`.
    pub source: PathBuf,

    /// Revision to export.
    ///
    /// Default: `HEAD`.
    pub revision: String,

    /// Archive format to create.
    ///
    /// `None` means auto-detect from the output file extension.
    ///
    /// Default: `None`.
    pub format: Option<ArchiveType>,

    /// Compression level (1-9).
    ///
    /// `None` uses format-specific defaults. Ignored for plain tar.
    ///
    /// Default: `None`.
    pub compression_level: Option<u8>,

    /// Report what would be archived without writing anything.
    ///
    /// Default: `false`.
    pub dry_run: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            verbose: false,
            use_attributes: true,
            force_submodules: false,
            extra: Vec::new(),
            source: PathBuf::from("."),
            revision: "HEAD".to_string(),
            format: None,
            compression_level: None,
            dry_run: false,
        }
    }
}

impl ExportConfig {
    /// Creates a new `ExportConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets verbose logging.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets whether `export-ignore` is honored.
    #[must_use]
    pub fn with_attributes(mut self, enabled: bool) -> Self {
        self.use_attributes = enabled;
        self
    }

    /// Sets whether submodules are force-initialized.
    #[must_use]
    pub fn with_force_submodules(mut self, enabled: bool) -> Self {
        self.force_submodules = enabled;
        self
    }

    /// Adds one extra path.
    #[must_use]
    pub fn with_extra<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.extra.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets the source repository path.
    #[must_use]
    pub fn with_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = path.as_ref().to_path_buf();
        self
    }

    /// Sets the revision to export.
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Sets the archive format.
    #[must_use]
    pub fn with_format(mut self, format: Option<ArchiveType>) -> Self {
        self.format = format;
        self
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Checks the configuration against the intended output path.
    ///
    /// Runs before any git command so misconfiguration is reported without
    /// touching the repository.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - the output path is empty, is an existing directory, or its parent
    ///   directory does not exist
    /// - the archive format is neither set nor inferable from the output name
    /// - the compression level is outside 1-9
    /// - the source path does not exist
    /// - an explicit prefix or an extra path is absolute or contains `..`
    pub fn validate(&self, output: &Path) -> Result<()> {
        if output.as_os_str().is_empty() {
            return Err(ExportError::invalid_config("output path is empty"));
        }
        if output.is_dir() {
            return Err(ExportError::invalid_config(format!(
                "output path is a directory: {}",
                output.display()
            )));
        }
        if let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
            && !parent.is_dir()
        {
            return Err(ExportError::invalid_config(format!(
                "output directory does not exist: {}",
                parent.display()
            )));
        }

        self.resolve_format(output)?;

        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ExportError::invalid_config(format!(
                "compression level must be 1-9, got {level}"
            )));
        }

        if !self.source.exists() {
            return Err(ExportError::SourceNotFound {
                path: self.source.clone(),
            });
        }

        if let Some(prefix) = &self.prefix {
            validate_prefix(prefix)?;
        }

        for extra in &self.extra {
            validate_extra(extra)?;
        }

        Ok(())
    }

    /// Checks that every extra path exists below the repository `root`.
    ///
    /// Runs once the repository top level is known and before anything is
    /// cloned.
    ///
    /// # Errors
    ///
    /// Returns `ExtraNotFound` for the first missing path.
    pub fn check_extras_exist(&self, root: &Path) -> Result<()> {
        for extra in &self.extra {
            let path = root.join(extra);
            if path.symlink_metadata().is_err() {
                return Err(ExportError::ExtraNotFound { path });
            }
        }
        Ok(())
    }

    /// Returns the archive format: explicit if set, otherwise detected from
    /// the output name.
    pub fn resolve_format(&self, output: &Path) -> Result<ArchiveType> {
        self.format.map_or_else(|| detect_format(output), Ok)
    }

    /// Returns the prefix entries are placed under, without a trailing `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_export_core::ExportConfig;
    /// use std::path::Path;
    ///
    /// let config = ExportConfig::default();
    /// assert_eq!(config.resolve_prefix(Path::new("dist/app-1.0.tar.gz")), "app-1.0");
    ///
    /// let config = ExportConfig::default().with_prefix("src/");
    /// assert_eq!(config.resolve_prefix(Path::new("dist/app-1.0.tar.gz")), "src");
    /// ```
    #[must_use]
    pub fn resolve_prefix(&self, output: &Path) -> String {
        let prefix = match &self.prefix {
            Some(prefix) => prefix.clone(),
            None => default_prefix(output).unwrap_or_default(),
        };
        prefix.trim_end_matches('/').to_string()
    }
}

/// Extra paths must stay inside the repository.
fn validate_extra(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ExportError::invalid_config("extra path is empty"));
    }
    validate_relative(path, "extra path", "relative to the repository")
}

/// Prefixes must keep every entry under one relative directory.
fn validate_prefix(prefix: &str) -> Result<()> {
    validate_relative(Path::new(prefix), "prefix", "a relative directory")
}

fn validate_relative(path: &Path, what: &str, expected: &str) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(ExportError::invalid_config(format!(
                    "{what} must not contain '..': {}",
                    path.display()
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ExportError::invalid_config(format!(
                    "{what} must be {expected}: {}",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.prefix, None);
        assert!(!config.verbose);
        assert!(config.use_attributes);
        assert!(!config.force_submodules);
        assert!(config.extra.is_empty());
        assert_eq!(config.source, PathBuf::from("."));
        assert_eq!(config.revision, "HEAD");
        assert_eq!(config.format, None);
        assert_eq!(config.compression_level, None);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_builders() {
        let config = ExportConfig::new()
            .with_prefix("pkg")
            .with_verbose(true)
            .with_attributes(false)
            .with_force_submodules(true)
            .with_extra("a")
            .with_extra("b/c")
            .with_source("/repo")
            .with_revision("main")
            .with_format(Some(ArchiveType::Zip))
            .with_compression_level(Some(9))
            .with_dry_run(true);

        assert_eq!(config.prefix.as_deref(), Some("pkg"));
        assert!(config.verbose);
        assert!(!config.use_attributes);
        assert!(config.force_submodules);
        assert_eq!(config.extra, vec![PathBuf::from("a"), PathBuf::from("b/c")]);
        assert_eq!(config.source, PathBuf::from("/repo"));
        assert_eq!(config.revision, "main");
        assert_eq!(config.format, Some(ArchiveType::Zip));
        assert_eq!(config.compression_level, Some(9));
        assert!(config.dry_run);
    }

    #[test]
    fn test_validate_accepts_good_config() {
        let temp = TempDir::new().unwrap();
        let config = ExportConfig::default()
            .with_source(temp.path())
            .with_extra("docs/generated");
        config.validate(&temp.path().join("out.tar.gz")).unwrap();
    }

    #[test]
    fn test_validate_output_checks() {
        let temp = TempDir::new().unwrap();
        let config = ExportConfig::default().with_source(temp.path());

        let err = config.validate(Path::new("")).unwrap_err();
        assert!(err.is_configuration_error());

        let err = config.validate(temp.path()).unwrap_err();
        assert!(err.to_string().contains("is a directory"));

        let err = config
            .validate(&temp.path().join("missing/out.zip"))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_format() {
        let temp = TempDir::new().unwrap();
        let config = ExportConfig::default().with_source(temp.path());

        let err = config.validate(&temp.path().join("out.rar")).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));

        let config = config.with_format(Some(ArchiveType::Tar));
        config.validate(&temp.path().join("out.rar")).unwrap();
    }

    #[test]
    fn test_validate_compression_level() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.zip");
        for level in [0, 10] {
            let config = ExportConfig::default()
                .with_source(temp.path())
                .with_compression_level(Some(level));
            assert!(config.validate(&out).unwrap_err().is_configuration_error());
        }
    }

    #[test]
    fn test_validate_missing_source() {
        let temp = TempDir::new().unwrap();
        let config = ExportConfig::default().with_source(temp.path().join("nope"));
        let err = config.validate(&temp.path().join("out.zip")).unwrap_err();
        assert!(matches!(err, ExportError::SourceNotFound { .. }));
    }

    #[test]
    fn test_validate_extra_paths() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.zip");
        for bad in ["../outside", "a/../../b", "/etc/passwd", ""] {
            let config = ExportConfig::default()
                .with_source(temp.path())
                .with_extra(bad);
            let err = config.validate(&out).unwrap_err();
            assert!(err.is_configuration_error(), "accepted {bad:?}");
        }

        let config = ExportConfig::default()
            .with_source(temp.path())
            .with_extra("./VERSION");
        config.validate(&out).unwrap();
    }

    #[test]
    fn test_validate_prefix_stays_relative() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.zip");
        for bad in ["../x", "a/../../b", "/abs"] {
            let config = ExportConfig::default()
                .with_source(temp.path())
                .with_prefix(bad);
            let err = config.validate(&out).unwrap_err();
            assert!(err.is_configuration_error(), "accepted {bad:?}");
            assert!(err.to_string().contains("prefix"));
        }

        for good in ["", "pkg-1.0", "a/b/"] {
            let config = ExportConfig::default()
                .with_source(temp.path())
                .with_prefix(good);
            config.validate(&out).unwrap();
        }
    }

    #[test]
    fn test_check_extras_exist() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("VERSION"), "1\n").unwrap();
        std::fs::create_dir(temp.path().join("docs")).unwrap();

        let config = ExportConfig::default()
            .with_extra("VERSION")
            .with_extra("docs");
        config.check_extras_exist(temp.path()).unwrap();

        let config = config.with_extra("NOPE");
        let err = config.check_extras_exist(temp.path()).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(
            matches!(err, ExportError::ExtraNotFound { path } if path == temp.path().join("NOPE"))
        );
    }

    #[test]
    fn test_resolve_prefix() {
        let out = Path::new("/tmp/release-2.0.zip");
        assert_eq!(ExportConfig::default().resolve_prefix(out), "release-2.0");
        assert_eq!(
            ExportConfig::default().with_prefix("").resolve_prefix(out),
            ""
        );
        assert_eq!(
            ExportConfig::default()
                .with_prefix("a/b//")
                .resolve_prefix(out),
            "a/b"
        );
    }
}
