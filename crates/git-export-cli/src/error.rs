//! Error conversion utilities for CLI.
//!
//! Wraps git-export-core's typed errors (thiserror) in user-facing context
//! (anyhow) with actionable hints, and maps them onto process exit codes.

use git_export_core::ExportError;
use std::path::Path;

/// Exit status for configuration and usage errors, matching clap.
pub const EXIT_CONFIGURATION: u8 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Adds a user-facing message with a hint to `ExportError`.
///
/// The original error stays in the chain so [`exit_code`] can classify it.
pub fn convert_export_error(err: ExportError, output: &Path, repo: &Path) -> anyhow::Error {
    let message = match &err {
        ExportError::UnsupportedFormat { format } => format!(
            "Cannot choose an archive format for '{format}'\n\
             HINT: Use a .tar, .tar.gz, .tgz, .tar.bz2, .tbz2 or .zip output name, or pass --format."
        ),
        ExportError::InvalidConfiguration { reason } => {
            format!("Invalid options for '{}': {reason}", output.display())
        }
        ExportError::SourceNotFound { path } => format!(
            "Repository not found: {}\n\
             HINT: Use --repo to point at a git working tree.",
            path.display()
        ),
        ExportError::ExtraNotFound { path } => format!(
            "Extra path not found: {}\n\
             HINT: --extra paths are relative to the repository root.",
            path.display()
        ),
        ExportError::RevisionNotFound { revision } => format!(
            "Revision '{revision}' does not name a commit in '{}'\n\
             HINT: Check the branch or tag name, or fetch it first.",
            repo.display()
        ),
        ExportError::GitFailed { .. } => format!(
            "git failed while exporting '{}'\n\
             HINT: Run with -vv to see every git command.",
            repo.display()
        ),
        ExportError::Io(_) | ExportError::Zip(_) => {
            format!("Failed to write archive '{}'", output.display())
        }
        ExportError::GitOutput { .. } => {
            format!("Error exporting '{}'", repo.display())
        }
    };

    anyhow::Error::new(err).context(message)
}

/// Returns the process exit status for an error.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let configuration = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ExportError>())
        .is_some_and(ExportError::is_configuration_error);
    if configuration {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}
