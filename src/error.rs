use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all job-level failure modes
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error parsing XML file: {file} - {details}")]
    ParseFailure { file: PathBuf, details: String },

    #[error("File does not exist: {path}")]
    MissingFile { path: PathBuf },

    #[error("Failed to create directory {path}: {source}")]
    DirectorySetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },
}

impl CompareError {
    /// Create a parse failure for `file` from any displayable parser error
    pub fn parse_failure(file: impl Into<PathBuf>, details: impl ToString) -> Self {
        CompareError::ParseFailure {
            file: file.into(),
            details: details.to_string(),
        }
    }

    /// Whether this error must abort the whole process rather than a single job
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompareError::DirectorySetup { .. })
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CompareError>;
