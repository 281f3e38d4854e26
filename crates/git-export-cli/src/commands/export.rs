//! Export command implementation.

use crate::cli::Cli;
use crate::error::convert_export_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use git_export_core::ExportConfig;
use git_export_core::NoopProgress;
use git_export_core::export_archive_with;
use git_export_core::git::SystemGit;

/// Maps the parsed command line onto an `ExportConfig`.
pub fn build_config(cli: &Cli) -> ExportConfig {
    let mut config = ExportConfig::default()
        .with_source(&cli.repo)
        .with_revision(cli.revision.clone())
        .with_verbose(cli.verbose > 0)
        .with_attributes(!cli.no_exclude)
        .with_force_submodules(cli.force_submodules)
        .with_format(cli.format)
        .with_compression_level(cli.compression_level)
        .with_dry_run(cli.dry_run);
    if let Some(prefix) = &cli.prefix {
        config = config.with_prefix(prefix.clone());
    }
    for extra in &cli.extra {
        config = config.with_extra(extra);
    }
    config
}

pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = build_config(cli);
    let git = SystemGit::new();

    // Use progress bar if TTY is detected (not quiet, not JSON, not verbose)
    let result = if !cli.dry_run && CliProgress::should_show(cli.quiet, cli.json, cli.verbose > 0)
    {
        let mut progress = CliProgress::new("Writing");
        export_archive_with(&git, &cli.output, &config, &mut progress)
    } else {
        let mut noop = NoopProgress;
        export_archive_with(&git, &cli.output, &config, &mut noop)
    };
    let report = result.map_err(|e| convert_export_error(e, &cli.output, &cli.repo))?;

    if report.is_dry_run() {
        formatter.format_dry_run(&cli.output, &report)?;
    } else {
        formatter.format_export_result(&cli.output, &report)?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use git_export_core::ArchiveType;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let cli = Cli::try_parse_from(["git-export", "out.tar.gz"]).unwrap();
        let config = build_config(&cli);
        assert_eq!(config.source, PathBuf::from("."));
        assert_eq!(config.revision, "HEAD");
        assert!(config.prefix.is_none());
        assert!(config.use_attributes);
        assert!(!config.force_submodules);
        assert!(!config.verbose);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_build_config_maps_flags() {
        let cli = Cli::try_parse_from([
            "git-export",
            "out.bin",
            "--repo",
            "/src/project",
            "--revision",
            "v2.0",
            "--prefix",
            "project-2.0",
            "--no-exclude",
            "--force-submodules",
            "--extra",
            "VERSION",
            "--dry-run",
            "--format",
            "zip",
            "-l",
            "3",
            "-v",
        ])
        .unwrap();
        let config = build_config(&cli);
        assert_eq!(config.source, PathBuf::from("/src/project"));
        assert_eq!(config.revision, "v2.0");
        assert_eq!(config.prefix.as_deref(), Some("project-2.0"));
        assert!(!config.use_attributes);
        assert!(config.force_submodules);
        assert_eq!(config.extra, vec![PathBuf::from("VERSION")]);
        assert!(config.dry_run);
        assert_eq!(config.format, Some(ArchiveType::Zip));
        assert_eq!(config.compression_level, Some(3));
        assert!(config.verbose);
    }
}
