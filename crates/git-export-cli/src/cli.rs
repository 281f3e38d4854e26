//! CLI argument parsing using clap.

use clap::Parser;
use git_export_core::ArchiveType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "git-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Archive to create; the format follows its extension
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Repository to export
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Revision to export (branch, tag or commit)
    #[arg(long, value_name = "REV", default_value = "HEAD")]
    pub revision: String,

    /// Directory to place entries under (default: output name without extension)
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Log progress; repeat for git command tracing
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Ignore export-ignore attributes
    #[arg(long)]
    pub no_exclude: bool,

    /// Initialize and update submodules step by step
    #[arg(long)]
    pub force_submodules: bool,

    /// Additional file or directory to include, relative to the repository
    /// (can be repeated)
    #[arg(long = "extra", value_name = "PATH")]
    pub extra: Vec<PathBuf>,

    /// List what would be archived without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Archive format, overriding the output extension
    #[arg(long, value_name = "FORMAT", value_parser = parse_format)]
    pub format: Option<ArchiveType>,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,
}

fn parse_format(s: &str) -> Result<ArchiveType, String> {
    s.parse::<ArchiveType>()
        .map_err(|_| format!("unknown format '{s}' (expected tar, tar.gz, tgz, tar.bz2, tbz2 or zip)"))
}
