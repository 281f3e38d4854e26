//! Error types for repository export operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExportError`.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while exporting a repository into an archive.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive format is unsupported or could not be inferred.
    #[error("unsupported archive format: {format}")]
    UnsupportedFormat {
        /// The format string or output name that was rejected.
        format: String,
    },

    /// The export was configured with invalid options.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// A source repository or extra path does not exist.
    #[error("source path not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// An extra path to include does not exist.
    #[error("extra path not found: {path}")]
    ExtraNotFound {
        /// The missing path, resolved against the repository root.
        path: PathBuf,
    },

    /// The requested revision does not resolve to a commit.
    #[error("revision not found: {revision}")]
    RevisionNotFound {
        /// The revision as given by the caller.
        revision: String,
    },

    /// A `git` invocation exited unsuccessfully.
    #[error("git {command} failed ({}): {stderr}", describe_exit(.code))]
    GitFailed {
        /// Arguments passed to git, joined by spaces.
        command: String,
        /// Exit code, or `None` if git was terminated by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// A `git` invocation produced output that could not be interpreted.
    #[error("unexpected output from git {command}: {reason}")]
    GitOutput {
        /// Arguments passed to git, joined by spaces.
        command: String,
        /// What was wrong with the output.
        reason: String,
    },

    /// The ZIP writer reported an error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[allow(clippy::ref_option)]
fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_string(),
        |code| format!("exit code {code}"),
    )
}

impl ExportError {
    /// Returns `true` if this error was caused by the caller's configuration
    /// rather than by git or the filesystem during the run.
    ///
    /// Configuration errors are detected before any repository work starts.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_export_core::ExportError;
    ///
    /// let err = ExportError::UnsupportedFormat {
    ///     format: "rar".to_string(),
    /// };
    /// assert!(err.is_configuration_error());
    ///
    /// let err = ExportError::RevisionNotFound {
    ///     revision: "v9.9".to_string(),
    /// };
    /// assert!(!err.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. }
                | Self::InvalidConfiguration { .. }
                | Self::SourceNotFound { .. }
                | Self::ExtraNotFound { .. }
        )
    }

    /// Returns `true` if this error came from running the `git` binary.
    #[must_use]
    pub const fn is_git_error(&self) -> bool {
        matches!(
            self,
            Self::GitFailed { .. } | Self::GitOutput { .. } | Self::RevisionNotFound { .. }
        )
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
