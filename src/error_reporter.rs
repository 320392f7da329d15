use crate::cli::VerbosityLevel;
use crate::comparator::{ComparisonResults, JobOutcome};
use crate::config::ConfigError;
use crate::error::CompareError;

/// Error reporter with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_timestamps: false,
        }
    }

    /// Create a new error reporter with additional options
    pub fn with_options(verbosity: VerbosityLevel, show_timestamps: bool) -> Self {
        Self {
            verbosity,
            show_timestamps,
        }
    }

    /// Report a comparison error with appropriate verbosity
    pub fn report_compare_error(&self, error: &CompareError) {
        eprintln!("{}", self.format_compare_error(error));
    }

    /// Report a configuration error
    pub fn report_config_error(&self, error: &ConfigError) {
        eprintln!("{}", self.format_config_error(error));
    }

    /// Report every failed job of a run
    pub fn report_failed_jobs(&self, results: &ComparisonResults) {
        for report in &results.reports {
            if let JobOutcome::Failed(error) = &report.outcome {
                self.report_compare_error(error);
            }
        }
    }

    /// Format a comparison error for the configured verbosity
    pub fn format_compare_error(&self, error: &CompareError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => self.format_error_brief(error),
            VerbosityLevel::Normal => self.format_error_normal(error),
            VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => self.format_error_debug(error),
        }
    }

    pub fn format_config_error(&self, error: &ConfigError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("Config error: {}", error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                format!(
                    "Error loading configuration: {}\n{}",
                    error,
                    self.get_config_help(error)
                )
            }
            VerbosityLevel::Debug => {
                format!(
                    "Error loading configuration: {}\nDebug: {:?}\n{}",
                    error,
                    error,
                    self.get_config_help(error)
                )
            }
        }
    }

    /// Format error for brief output (quiet mode)
    fn format_error_brief(&self, error: &CompareError) -> String {
        if error.is_fatal() {
            format!("FATAL: {}", error)
        } else {
            format!("ERROR: {}", error)
        }
    }

    /// Format error for normal output
    fn format_error_normal(&self, error: &CompareError) -> String {
        let timestamp = if self.show_timestamps {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        };

        format!("{}Error: {}", timestamp, error)
    }

    /// Format error for verbose output
    fn format_error_verbose(&self, error: &CompareError) -> String {
        let mut output = self.format_error_normal(error);

        match error {
            CompareError::MissingFile { path } => {
                output.push_str(&format!(
                    "\nSuggestion: Place the file at {} or fix the file name in the configuration",
                    path.display()
                ));
            }
            CompareError::ParseFailure { file, .. } => {
                output.push_str(&format!(
                    "\nSuggestion: Check that {} is well-formed XML",
                    file.display()
                ));
            }
            CompareError::DirectorySetup { .. } => {
                output.push_str("\nSuggestion: Check permissions on the base directory");
            }
            _ => {}
        }

        output
    }

    /// Format error for debug output
    fn format_error_debug(&self, error: &CompareError) -> String {
        let mut output = self.format_error_verbose(error);
        output.push_str(&format!("\nDebug Info: {:?}", error));

        output.push_str("\nError Chain:");
        let mut current_error: &dyn std::error::Error = error;
        let mut level = 0;
        while let Some(source) = current_error.source() {
            output.push_str(&format!("\n  {}: {}", level + 1, source));
            current_error = source;
            level += 1;
        }

        output
    }

    /// Get helpful suggestions for configuration errors
    fn get_config_help(&self, error: &ConfigError) -> String {
        match error {
            ConfigError::Io(_) => "Check that the configuration file exists and is readable".to_string(),
            ConfigError::JsonParsing(_) => {
                "Expected a JSON array of {\"old_file\", \"new_file\", \"tags\"} objects".to_string()
            }
            ConfigError::TomlParsing(_) | ConfigError::TomlSerialize(_) => {
                "Expected [[comparison]] tables with old_file, new_file and tags".to_string()
            }
            ConfigError::Validation(_) => {
                "Check the --jobs value and the verbosity flags".to_string()
            }
            ConfigError::Environment(_) => {
                "Fix or unset the XML_COMPARE_* environment variable".to_string()
            }
            ConfigError::UnsupportedFormat(_) => {
                "Use a .json or .toml configuration file".to_string()
            }
        }
    }
}
