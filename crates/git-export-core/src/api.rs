//! High-level public API for exporting a repository into an archive.

use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::ExportConfig;
use crate::ExportError;
use crate::ProgressCallback;
use crate::Result;
use crate::checkout::Checkout;
use crate::creation::ArchiveEntry;
use crate::creation::CreationReport;
use crate::creation::plan_entries;
use crate::creation::write_archive;
use crate::formats::ArchiveType;
use crate::git;
use crate::git::GitRunner;
use crate::git::SystemGit;
use crate::report::NoopProgress;
use crate::walker::RepoWalker;

/// Outcome of one export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Commit the archive was built from.
    pub commit: String,
    /// Directory every entry was placed under; empty for the archive root.
    pub prefix: String,
    /// Container format that was (or would have been) written.
    pub format: ArchiveType,
    /// Entries in archive order. Sources point into the removed checkout
    /// for tracked files and into the source repository for extras.
    pub entries: Vec<ArchiveEntry>,
    /// Candidates dropped because an earlier entry had the same name.
    pub duplicates_skipped: usize,
    /// Non-fatal problems met while planning, such as skipped extras.
    pub warnings: Vec<String>,
    /// Archive statistics; `None` for a dry run.
    pub creation: Option<CreationReport>,
}

impl ExportReport {
    /// Returns `true` if no archive was written.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.creation.is_none()
    }

    /// Returns `true` if planning produced any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Exports a repository into an archive using the `git` binary on `PATH`.
///
/// # Errors
///
/// Returns a configuration error before running git if the output path,
/// format, prefix, source or extra paths are invalid, and before cloning if
/// an extra path is missing from the repository. Returns a git error if the
/// checkout or enumeration fails. The temporary checkout is removed in
/// every case.
///
/// # Examples
///
/// ```no_run
/// use git_export_core::ExportConfig;
/// use git_export_core::export_archive;
///
/// let config = ExportConfig::default().with_revision("v1.0.0");
/// let report = export_archive("dist/project-1.0.0.tar.gz", &config)?;
/// println!("Archived {} entries from {}", report.entries.len(), report.commit);
/// # Ok::<(), git_export_core::ExportError>(())
/// ```
pub fn export_archive<P: AsRef<Path>>(output: P, config: &ExportConfig) -> Result<ExportReport> {
    export_archive_with(&SystemGit::new(), output.as_ref(), config, &mut NoopProgress)
}

/// Exports a repository into an archive with a caller-supplied git runner
/// and progress callback.
///
/// Runs the whole pipeline: validate, check out the revision into a
/// temporary directory, enumerate exportable files, plan entry names and,
/// unless this is a dry run, write the archive atomically.
pub fn export_archive_with<G: GitRunner + ?Sized>(
    git: &G,
    output: &Path,
    config: &ExportConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExportReport> {
    config.validate(output)?;
    let format = config.resolve_format(output)?;
    let prefix = config.resolve_prefix(output);

    let source = git::toplevel(git, &config.source)?;
    config.check_extras_exist(&source)?;

    let checkout = Checkout::prepare(git, &source, &config.revision)?;
    let files = RepoWalker::new(git)
        .with_attributes(config.use_attributes)
        .with_force_submodules(config.force_submodules)
        .with_origin(checkout.source())
        .list_files(checkout.root())?;

    let plan = plan_entries(
        checkout.root(),
        &files,
        checkout.source(),
        &config.extra,
        &prefix,
    )?;
    if config.verbose {
        for entry in &plan.entries {
            info!(source = %entry.source.display(), name = %entry.name, "adding");
        }
    }

    let creation = if config.dry_run {
        None
    } else {
        Some(write_archive(
            output,
            format,
            &plan.entries,
            config.compression_level,
            progress,
        )?)
    };

    let commit = checkout.commit().to_string();
    checkout.close()?;
    info!(%commit, entries = plan.entries.len(), dry_run = config.dry_run, "export finished");

    Ok(ExportReport {
        commit,
        prefix,
        format,
        entries: plan.entries,
        duplicates_skipped: plan.duplicates_skipped,
        warnings: plan.warnings,
        creation,
    })
}

/// Builder for exporting repositories with a fluent API.
///
/// # Examples
///
/// ```no_run
/// use git_export_core::ArchiveExporter;
///
/// let report = ArchiveExporter::new()
///     .output("dist/project.zip")
///     .source("path/to/repo")
///     .revision("main")
///     .extra("build/VERSION")
///     .compression_level(9)
///     .export()?;
///
/// println!("Wrote {} entries", report.entries.len());
/// # Ok::<(), git_export_core::ExportError>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveExporter {
    output_path: Option<PathBuf>,
    config: ExportConfig,
}

impl ArchiveExporter {
    /// Creates a new `ArchiveExporter` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output archive path.
    ///
    /// The archive format is auto-detected from the file extension unless
    /// set with `format()`.
    #[must_use]
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the repository to export.
    #[must_use]
    pub fn source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.source = path.as_ref().to_path_buf();
        self
    }

    /// Sets the revision to export.
    #[must_use]
    pub fn revision<S: Into<String>>(mut self, revision: S) -> Self {
        self.config.revision = revision.into();
        self
    }

    /// Sets the directory entries are placed under.
    #[must_use]
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.prefix = Some(prefix.into());
        self
    }

    /// Adds a path to include regardless of tracking or exclusion.
    #[must_use]
    pub fn extra<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.extra.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets whether `export-ignore` is honored.
    #[must_use]
    pub fn attributes(mut self, enabled: bool) -> Self {
        self.config.use_attributes = enabled;
        self
    }

    /// Sets whether submodules are force-initialized.
    #[must_use]
    pub fn force_submodules(mut self, enabled: bool) -> Self {
        self.config.force_submodules = enabled;
        self
    }

    /// Sets an explicit archive format.
    #[must_use]
    pub fn format(mut self, format: ArchiveType) -> Self {
        self.config.format = Some(format);
        self
    }

    /// Sets the compression level (1-9).
    #[must_use]
    pub fn compression_level(mut self, level: u8) -> Self {
        self.config.compression_level = Some(level);
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the export with the system `git`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if no output path was set, otherwise
    /// the errors of [`export_archive_with`].
    pub fn export(self) -> Result<ExportReport> {
        self.export_with(&SystemGit::new(), &mut NoopProgress)
    }

    /// Runs the export with the given git runner and progress callback.
    pub fn export_with<G: GitRunner + ?Sized>(
        self,
        git: &G,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExportReport> {
        let output = self
            .output_path
            .ok_or_else(|| ExportError::invalid_config("output path not set"))?;
        export_archive_with(git, &output, &self.config, progress)
    }
}
