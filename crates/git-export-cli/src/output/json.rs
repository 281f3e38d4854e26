//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use git_export_core::ExportReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct EntryOutput {
    source: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct DryRunOutput {
    output_path: String,
    commit: String,
    prefix: String,
    format: String,
    duplicates_skipped: usize,
    warnings: Vec<String>,
    entries: Vec<EntryOutput>,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    output_path: String,
    commit: String,
    prefix: String,
    format: String,
    files_added: usize,
    symlinks_added: usize,
    entries_written: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    compression_percentage: f64,
    duplicates_skipped: usize,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_export_result(&self, output: &Path, report: &ExportReport) -> Result<()> {
        let creation = report.creation.clone().unwrap_or_default();

        let data = ExportOutput {
            output_path: output.display().to_string(),
            commit: report.commit.clone(),
            prefix: report.prefix.clone(),
            format: report.format.to_string(),
            files_added: creation.files_added,
            symlinks_added: creation.symlinks_added,
            entries_written: creation.total_items(),
            bytes_written: creation.bytes_written,
            bytes_compressed: creation.bytes_compressed,
            compression_ratio: creation.compression_ratio(),
            compression_percentage: creation.compression_percentage(),
            duplicates_skipped: report.duplicates_skipped,
            duration_ms: creation.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("export", data))
    }

    fn format_dry_run(&self, output: &Path, report: &ExportReport) -> Result<()> {
        let data = DryRunOutput {
            output_path: output.display().to_string(),
            commit: report.commit.clone(),
            prefix: report.prefix.clone(),
            format: report.format.to_string(),
            duplicates_skipped: report.duplicates_skipped,
            warnings: report.warnings.clone(),
            entries: report
                .entries
                .iter()
                .map(|entry| EntryOutput {
                    source: entry.source.display().to_string(),
                    name: entry.name.clone(),
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("dry-run", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("export", format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
