//! Output and Reporting
//!
//! This module turns comparison results into console reports: the indented
//! human report, a JSON document, or a one-block summary.

use serde::Serialize;
use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::comparator::{ComparisonResults, InvalidReason, JobOutcome, JobReport, TagResult};
use crate::document::Element;
use crate::render::element_to_string;

/// Output formatter for comparison results
pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel, format: OutputFormat) -> Self {
        Self {
            verbosity,
            format,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_results(&self, results: &ComparisonResults) -> String {
        match self.format {
            OutputFormat::Json => self.format_json(results),
            OutputFormat::Summary => self.format_summary(results),
            OutputFormat::Human => self.format_human(results),
        }
    }

    fn format_human(&self, results: &ComparisonResults) -> String {
        let mut output = String::new();

        match self.verbosity {
            VerbosityLevel::Quiet => {
                if results.has_changes() || results.has_failures() {
                    output.push_str(&self.format_summary(results));
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose | VerbosityLevel::Debug => {
                for report in &results.reports {
                    output.push_str(&self.format_job_report(report));
                }

                if self.verbosity >= VerbosityLevel::Verbose {
                    output.push('\n');
                    output.push_str(&self.format_summary(results));
                }
            }
        }

        output
    }

    pub fn format_job_report(&self, report: &JobReport) -> String {
        let mut output = format!("\n=== Comparison: {} ===\n", report.label);

        match &report.outcome {
            JobOutcome::Failed(error) => {
                output.push_str(&format!("{} {}\n", self.colorize("Error:", "33"), error));
            }
            JobOutcome::Compared(tag_reports) => {
                for tag_report in tag_reports {
                    output.push_str(&format!("\nTag: <{}>\n", tag_report.tag));
                    output.push_str(&self.format_tag_result(&tag_report.result));
                }
            }
        }

        if self.verbosity == VerbosityLevel::Debug {
            output.push_str(&format!(
                "\n  old: {}\n  new: {}\n  duration: {}\n",
                report.old_path.display(),
                report.new_path.display(),
                format_duration(report.duration)
            ));
        }

        output
    }

    fn format_tag_result(&self, result: &TagResult) -> String {
        match result {
            TagResult::Invalid(reason) => {
                let mut output = self.colorize("Invalid Input", "31");
                if self.verbosity >= VerbosityLevel::Verbose {
                    output.push_str(&format!(" ({})", reason));
                }
                output.push('\n');
                output
            }
            TagResult::Changes {
                additions,
                removals,
            } => {
                let mut output = String::new();
                output.push_str(&self.colorize("Additions:", "32"));
                output.push('\n');
                output.push_str(&format_elements(additions));
                output.push('\n');
                output.push_str(&self.colorize("Removals:", "31"));
                output.push('\n');
                output.push_str(&format_elements(removals));
                output
            }
        }
    }

    fn format_summary(&self, results: &ComparisonResults) -> String {
        let mut output = String::new();
        output.push_str("Comparison Summary:\n");
        output.push_str(&format!("  Comparisons: {}\n", results.reports.len()));
        if results.jobs_failed > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", "33"),
                results.jobs_failed
            ));
        }
        output.push_str(&format!("  Tags compared: {}\n", results.tags_compared));
        if results.tags_invalid > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                results.tags_invalid
            ));
        }
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Additions:", "32"),
            results.additions
        ));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Removals:", "31"),
            results.removals
        ));
        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(results.total_duration)
        ));
        output
    }

    fn format_json(&self, results: &ComparisonResults) -> String {
        let report = JsonReport::from(results);
        // Plain data structs with string keys cannot fail to serialize.
        serde_json::to_string_pretty(&report).unwrap_or_default()
    }
}

/// Rendered elements, one after another, or a tab-indented `None`
fn format_elements(elements: &[Element]) -> String {
    if elements.is_empty() {
        return "\tNone\n".to_string();
    }
    let mut output = String::new();
    for element in elements {
        output.push_str(&element_to_string(element));
        output.push('\n');
    }
    output
}

#[derive(Serialize)]
struct JsonReport<'a> {
    comparisons: Vec<JsonComparison<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonComparison<'a> {
    comparison: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    tags: Vec<JsonTag<'a>>,
}

#[derive(Serialize)]
struct JsonTag<'a> {
    tag: &'a str,
    invalid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a InvalidReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removals: Option<Vec<String>>,
}

#[derive(Serialize)]
struct JsonSummary {
    comparisons: usize,
    failed: usize,
    tags_compared: usize,
    tags_invalid: usize,
    additions: usize,
    removals: usize,
    duration_ms: u128,
}

impl<'a> From<&'a ComparisonResults> for JsonReport<'a> {
    fn from(results: &'a ComparisonResults) -> Self {
        let comparisons = results
            .reports
            .iter()
            .map(|report| {
                let error = match &report.outcome {
                    JobOutcome::Failed(error) => Some(error.to_string()),
                    JobOutcome::Compared(_) => None,
                };
                let tags = report
                    .tag_reports()
                    .iter()
                    .map(|tag_report| match &tag_report.result {
                        TagResult::Invalid(reason) => JsonTag {
                            tag: &tag_report.tag,
                            invalid: true,
                            reason: Some(reason),
                            additions: None,
                            removals: None,
                        },
                        TagResult::Changes {
                            additions,
                            removals,
                        } => JsonTag {
                            tag: &tag_report.tag,
                            invalid: false,
                            reason: None,
                            additions: Some(additions.iter().map(element_to_string).collect()),
                            removals: Some(removals.iter().map(element_to_string).collect()),
                        },
                    })
                    .collect();

                JsonComparison {
                    comparison: &report.label,
                    error,
                    tags,
                }
            })
            .collect();

        Self {
            comparisons,
            summary: JsonSummary {
                comparisons: results.reports.len(),
                failed: results.jobs_failed,
                tags_compared: results.tags_compared,
                tags_invalid: results.tags_invalid,
                additions: results.additions,
                removals: results.removals,
                duration_ms: results.total_duration.as_millis(),
            },
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
