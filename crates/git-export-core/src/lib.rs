//! Export tracked git repository contents into release archives.
//!
//! `git-export-core` clones a repository at a given revision into a
//! temporary directory, lists every tracked file across the repository and
//! its submodules, drops paths marked `export-ignore` in gitattributes, and
//! writes the rest into a tar, tar.gz, tar.bz2 or zip archive under a
//! single top-level prefix.
//!
//! # Examples
//!
//! ```no_run
//! use git_export_core::ExportConfig;
//! use git_export_core::export_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::default().with_source("path/to/repo");
//! let report = export_archive("dist/project-1.0.tar.gz", &config)?;
//! println!("Archived {} entries under {}/", report.entries.len(), report.prefix);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod attributes;
pub mod checkout;
pub mod config;
pub mod creation;
pub mod error;
pub mod filters;
pub mod formats;
pub mod git;
pub mod io;
pub mod report;
pub mod walker;

#[cfg(test)]
mod test_utils;

// Re-export main API types
pub use api::ArchiveExporter;
pub use api::ExportReport;
pub use api::export_archive;
pub use api::export_archive_with;
pub use config::ExportConfig;
pub use creation::CreationReport;
pub use error::ExportError;
pub use error::Result;
pub use formats::ArchiveType;
pub use report::NoopProgress;
pub use report::ProgressCallback;
