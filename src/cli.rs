use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show summaries and critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Show all available debugging information
    Debug,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Additions and removals rendered as indented XML
    #[default]
    Human,
    /// Machine-readable JSON
    Json,
    /// Counters only
    Summary,
}

/// Compare child elements of selected tags between old and new XML files
#[derive(Parser, Debug, Clone)]
#[command(name = "xml-compare")]
#[command(
    about = "Report child elements added or removed between old and new versions of XML files"
)]
#[command(version)]
pub struct Cli {
    /// Directory containing the old/ and new/ folders
    #[arg(short = 'b', long = "base-dir")]
    pub base_dir: Option<PathBuf>,

    /// Comparison configuration file (JSON or TOML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Old file for a single ad-hoc comparison (relative to old/)
    #[arg(long = "old", requires_all = ["new_file", "tags"])]
    pub old_file: Option<String>,

    /// New file for a single ad-hoc comparison (relative to new/)
    #[arg(long = "new", requires_all = ["old_file", "tags"])]
    pub new_file: Option<String>,

    /// Tags to compare in the ad-hoc comparison
    #[arg(long = "tag", action = clap::ArgAction::Append)]
    pub tags: Vec<String>,

    /// Write the effective comparison list to this file
    #[arg(long = "save-config")]
    pub save_config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of comparisons to run concurrently
    #[arg(short = 'j', long = "jobs")]
    pub jobs: Option<usize>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (summary and errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Show debugging details in reports and error messages
    #[arg(long = "debug", conflicts_with = "quiet")]
    pub debug: bool,

    /// Exit with a non-zero status when any addition or removal is found
    #[arg(long = "fail-on-changes")]
    pub fail_on_changes: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Tags of the ad-hoc comparison with blanks removed
    pub fn get_tags(&self) -> Vec<String> {
        self.tags
            .iter()
            .flat_map(|tag| tag.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether an ad-hoc comparison was given on the command line
    pub fn has_adhoc_job(&self) -> bool {
        self.old_file.is_some() && self.new_file.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(base_dir) = &self.base_dir
            && base_dir.exists()
            && !base_dir.is_dir()
        {
            return Err(format!("Base path is not a directory: {}", base_dir.display()));
        }
        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err("Number of concurrent jobs must be greater than 0".to_string());
        }
        if self.has_adhoc_job() && self.get_tags().is_empty() {
            return Err("At least one --tag is required with --old/--new".to_string());
        }
        Ok(())
    }
}
