use crate::cli::{Cli, OutputFormat, VerbosityLevel};
use crate::comparator::ComparisonJob;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Default comparison configuration file name, looked up in the base directory
pub const DEFAULT_CONFIG_FILE: &str = "comparison_config.json";

/// Upper bound for concurrently running comparisons
pub const MAX_CONCURRENT_JOBS: usize = 256;

/// Trait for abstracting environment variable access
#[cfg_attr(test, mockall::automock)]
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Application settings resolved from defaults, environment and CLI
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory containing `old/` and `new/`
    pub base_dir: PathBuf,
    /// Explicit comparison configuration file
    pub config_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub verbose: bool,
    pub quiet: bool,
    pub debug: bool,
    /// Number of comparisons run at the same time
    pub concurrency: usize,
    pub fail_on_changes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            config_file: None,
            format: OutputFormat::Human,
            verbose: false,
            quiet: false,
            debug: false,
            concurrency: 1,
            fail_on_changes: false,
        }
    }
}

impl Settings {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.debug {
            VerbosityLevel::Debug
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// On-disk layout of a TOML comparison file: `[[comparison]]` tables
#[derive(Debug, Default, Serialize, Deserialize)]
struct TomlJobFile {
    #[serde(default)]
    comparison: Vec<ComparisonJob>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobFileFormat {
    Json,
    Toml,
}

fn job_file_format(path: &Path) -> Result<Option<JobFileFormat>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Some(JobFileFormat::Json)),
        Some("toml") => Ok(Some(JobFileFormat::Toml)),
        Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        None => Ok(None),
    }
}

/// Parse a comparison list from text in the given format
fn parse_jobs(content: &str, format: Option<JobFileFormat>) -> Result<Vec<ComparisonJob>> {
    match format {
        Some(JobFileFormat::Json) => Ok(serde_json::from_str(content)?),
        Some(JobFileFormat::Toml) => Ok(toml::from_str::<TomlJobFile>(content)?.comparison),
        None => {
            // Try JSON first, then TOML
            if let Ok(jobs) = serde_json::from_str::<Vec<ComparisonJob>>(content) {
                Ok(jobs)
            } else {
                Ok(toml::from_str::<TomlJobFile>(content)?.comparison)
            }
        }
    }
}

/// Load and validate the comparison list stored at `path`
pub async fn load_jobs(path: &Path) -> Result<Vec<ComparisonJob>> {
    let format = job_file_format(path)?;
    let content = tokio::fs::read_to_string(path).await?;
    let jobs = parse_jobs(&content, format)?;
    Ok(retain_valid_jobs(jobs))
}

/// Write a comparison list to `path`; JSON is indented with four spaces
pub async fn save_jobs(path: &Path, jobs: &[ComparisonJob]) -> Result<()> {
    let content = match job_file_format(path)?.unwrap_or(JobFileFormat::Json) {
        JobFileFormat::Json => jobs_to_json(jobs)?,
        JobFileFormat::Toml => toml::to_string_pretty(&TomlJobFile {
            comparison: jobs.to_vec(),
        })?,
    };
    tokio::fs::write(path, content).await?;
    Ok(())
}

fn jobs_to_json(jobs: &[ComparisonJob]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    jobs.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| ConfigError::Validation(e.to_string()))
}

/// Drop entries that do not name both files, keeping the rest
pub fn retain_valid_jobs(jobs: Vec<ComparisonJob>) -> Vec<ComparisonJob> {
    jobs.into_iter()
        .enumerate()
        .filter_map(|(index, job)| match job.validate() {
            Ok(()) => Some(job),
            Err(reason) => {
                warn!(entry = index, reason = %reason, "Skipping comparison entry");
                None
            }
        })
        .collect()
}

/// Settings manager for loading and merging settings
pub struct SettingsManager;

impl SettingsManager {
    /// Load settings with precedence: defaults -> environment -> CLI
    pub fn load_settings(cli: &Cli) -> Result<Settings> {
        Self::load_settings_with(&SystemEnvProvider, cli)
    }

    /// Load settings with a custom environment provider
    pub fn load_settings_with(env: &impl EnvProvider, cli: &Cli) -> Result<Settings> {
        let settings = Self::apply_environment_overrides_with(env, Settings::default())?;
        let settings = Self::merge_with_cli(settings, cli);
        Self::validate_settings(&settings)?;
        Ok(settings)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut settings: Settings,
    ) -> Result<Settings> {
        if let Some(base_dir) = env.get("XML_COMPARE_BASE_DIR") {
            settings.base_dir = PathBuf::from(base_dir);
        }

        if let Some(config_file) = env.get("XML_COMPARE_CONFIG") {
            settings.config_file = Some(PathBuf::from(config_file));
        }

        if let Some(format) = env.get("XML_COMPARE_FORMAT") {
            settings.format = match format.to_lowercase().as_str() {
                "human" => OutputFormat::Human,
                "json" => OutputFormat::Json,
                "summary" => OutputFormat::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid XML_COMPARE_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        if let Some(jobs) = env.get("XML_COMPARE_JOBS") {
            settings.concurrency = jobs.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid XML_COMPARE_JOBS value: {}", jobs))
            })?;
        }

        if let Some(verbose) = env.get("XML_COMPARE_VERBOSE") {
            settings.verbose = verbose.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid XML_COMPARE_VERBOSE value: {}", verbose))
            })?;
        }

        if let Some(quiet) = env.get("XML_COMPARE_QUIET") {
            settings.quiet = quiet.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid XML_COMPARE_QUIET value: {}", quiet))
            })?;
        }

        Ok(settings)
    }

    /// Merge CLI arguments with settings (CLI takes precedence where given)
    pub fn merge_with_cli(mut settings: Settings, cli: &Cli) -> Settings {
        if let Some(base_dir) = &cli.base_dir {
            settings.base_dir = base_dir.clone();
        }
        if let Some(config) = &cli.config {
            settings.config_file = Some(config.clone());
        }
        if let Some(format) = cli.format {
            settings.format = format;
        }
        if let Some(jobs) = cli.jobs {
            settings.concurrency = jobs;
        }
        if cli.verbose {
            settings.verbose = true;
            settings.quiet = false;
        }
        if cli.quiet {
            settings.quiet = true;
            settings.verbose = false;
        }
        if cli.debug {
            settings.debug = true;
            settings.quiet = false;
        }
        if cli.fail_on_changes {
            settings.fail_on_changes = true;
        }
        settings
    }

    /// Validate settings values
    pub fn validate_settings(settings: &Settings) -> Result<()> {
        if settings.concurrency == 0 {
            return Err(ConfigError::Validation(
                "Number of concurrent jobs must be greater than 0".to_string(),
            ));
        }
        if settings.concurrency > MAX_CONCURRENT_JOBS {
            return Err(ConfigError::Validation(format!(
                "Number of concurrent jobs cannot exceed {}",
                MAX_CONCURRENT_JOBS
            )));
        }

        if settings.verbose && settings.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        if let Some(config_file) = &settings.config_file {
            job_file_format(config_file)?;
        }

        Ok(())
    }

    /// Find the comparison configuration file to use, if any
    ///
    /// An explicit file is returned even when it does not exist, so that a
    /// typo surfaces as a load error instead of silently using the defaults.
    pub fn find_config_file(settings: &Settings) -> Option<PathBuf> {
        if let Some(explicit) = &settings.config_file {
            return Some(explicit.clone());
        }

        let config_names = [DEFAULT_CONFIG_FILE, "comparison_config.toml"];

        for name in &config_names {
            let path = settings.base_dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("xml-compare");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }
}
