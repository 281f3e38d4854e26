//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use git_export_core::ExportReport;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn short_commit(commit: &str) -> &str {
        commit.get(..12).unwrap_or(commit)
    }

    fn prefix_label(prefix: &str) -> String {
        if prefix.is_empty() {
            "(archive root)".to_string()
        } else {
            format!("{prefix}/")
        }
    }

    fn headline(&self, mark: &str, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style(mark).green().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }
        for warning in warnings {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_export_result(&self, output: &Path, report: &ExportReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        let Some(creation) = &report.creation else {
            return self.format_dry_run(output, report);
        };

        self.headline("✓", &format!("Archive created: {}", output.display()));

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Commit:           {}",
            Self::short_commit(&report.commit)
        ));
        let _ = self.term.write_line(&format!(
            "  Prefix:           {}",
            Self::prefix_label(&report.prefix)
        ));
        let _ = self
            .term
            .write_line(&format!("  Format:           {}", report.format));
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(creation.files_added)
        ));
        if creation.symlinks_added > 0 {
            let _ = self.term.write_line(&format!(
                "  Symlinks:         {}",
                Self::format_number(creation.symlinks_added)
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(creation.bytes_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(creation.bytes_compressed)
        ));
        if creation.compression_percentage() > 0.0 {
            let _ = self.term.write_line(&format!(
                "  Compression:      {:.1}%",
                creation.compression_percentage()
            ));
        }
        if report.duplicates_skipped > 0 {
            let _ = self.term.write_line(&format!(
                "  Duplicates:       {}",
                report.duplicates_skipped
            ));
        }
        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Entries written:  {}",
                Self::format_number(creation.total_items())
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", creation.duration));
        }

        self.warnings(&report.warnings);

        Ok(())
    }

    fn format_dry_run(&self, output: &Path, report: &ExportReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &report.entries {
            let _ = self
                .term
                .write_line(&format!("{} => {}", entry.source.display(), entry.name));
        }

        let _ = self.term.write_line("");
        self.headline(
            "✓",
            &format!(
                "Dry run: {} entries would be written to {} ({}, commit {})",
                Self::format_number(report.entries.len()),
                output.display(),
                report.format,
                Self::short_commit(&report.commit)
            ),
        );
        if report.duplicates_skipped > 0 {
            let _ = self.term.write_line(&format!(
                "  Duplicates skipped: {}",
                report.duplicates_skipped
            ));
        }
        self.warnings(&report.warnings);

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
