//! # xml-compare Library
//!
//! Compares two versions of XML documents and reports, for selected tags,
//! which child elements were added or removed. Children are matched by a
//! signature built from their tag, sorted attributes and trimmed text.

pub mod cli;
pub mod comparator;
pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod error_reporter;
pub mod locator;
pub mod logging;
pub mod output;
pub mod render;
pub mod signature;

pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use comparator::{
    ComparisonJob, ComparisonManager, ComparisonResults, InvalidReason, JobOutcome, JobReport,
    MissingFrom, RunConfig, TagReport, TagResult, compare_documents,
};
pub use config::{ConfigError, EnvProvider, Settings, SettingsManager, SystemEnvProvider};
pub use diff::{ChildDiff, diff};
pub use document::{Element, load_document, parse_document, parse_document_bytes};
pub use error::CompareError;
pub use error_reporter::ErrorReporter;
pub use locator::{Located, locate};
pub use output::Output;
pub use render::{element_to_string, render_element};
pub use signature::{Signature, signature};
