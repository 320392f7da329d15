//! Comparison Orchestration
//!
//! This module drives whole comparison runs:
//! - **Jobs**: each [`ComparisonJob`] names an old file, a new file and the tags to compare
//! - **Per-tag state machine**: locate the tag in both documents, guard against
//!   absence and hierarchy mismatches, then diff the located elements' children
//! - **Failure isolation**: a missing or unparsable file fails only its own job,
//!   an invalid tag only its own result
//! - **Bounded concurrency**: jobs run sequentially by default, or as
//!   semaphore-gated tokio tasks when a higher limit is configured
//!
//! Results always come back in job configuration order.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{self, ConfigError};
use crate::diff::diff;
use crate::document::{Element, load_document};
use crate::error::{CompareError, Result};
use crate::locator::locate;

/// Directory holding the old versions of compared documents
pub const OLD_DIR: &str = "old";
/// Directory holding the new versions of compared documents
pub const NEW_DIR: &str = "new";

/// One configured comparison: an old file, a new file and the tags to compare
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonJob {
    pub old_file: String,
    pub new_file: String,
    pub tags: Vec<String>,
}

impl ComparisonJob {
    pub fn new(
        old_file: impl Into<String>,
        new_file: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            old_file: old_file.into(),
            new_file: new_file.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Key under which this job's results are reported
    pub fn label(&self) -> String {
        format!("{} -> {}", self.old_file, self.new_file)
    }

    /// Jobs used when no configuration file exists
    pub fn default_jobs() -> Vec<ComparisonJob> {
        vec![ComparisonJob::new("file1.xml", "file2.xml", ["a", "root"])]
    }

    /// Check that the job names both files
    ///
    /// An empty tag list is valid; such a job reports no tag results.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.old_file.trim().is_empty() {
            return Err("old_file must not be empty".to_string());
        }
        if self.new_file.trim().is_empty() {
            return Err("new_file must not be empty".to_string());
        }
        Ok(())
    }
}

/// Which document lacked the requested tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFrom {
    Old,
    New,
    Both,
}

/// Why a tag could not be compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    /// The tag does not occur in one or both documents
    TagNotFound { missing_from: MissingFrom },
    /// The tag occurs in both documents but under different ancestors
    HierarchyMismatch {
        old_path: Vec<String>,
        new_path: Vec<String>,
    },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::TagNotFound { missing_from } => match missing_from {
                MissingFrom::Old => write!(f, "tag not found in the old file"),
                MissingFrom::New => write!(f, "tag not found in the new file"),
                MissingFrom::Both => write!(f, "tag not found in either file"),
            },
            InvalidReason::HierarchyMismatch { old_path, new_path } => write!(
                f,
                "tag is not at the same hierarchy level in both files (old: /{}, new: /{})",
                old_path.join("/"),
                new_path.join("/")
            ),
        }
    }
}

/// Outcome of comparing one tag between two documents
#[derive(Debug, Clone, PartialEq)]
pub enum TagResult {
    Invalid(InvalidReason),
    Changes {
        additions: Vec<Element>,
        removals: Vec<Element>,
    },
}

impl TagResult {
    pub fn is_invalid(&self) -> bool {
        matches!(self, TagResult::Invalid(_))
    }

    /// Number of added and removed children; zero for invalid results
    pub fn change_count(&self) -> usize {
        match self {
            TagResult::Invalid(_) => 0,
            TagResult::Changes {
                additions,
                removals,
            } => additions.len() + removals.len(),
        }
    }
}

/// Result for one configured tag of a job
#[derive(Debug, Clone, PartialEq)]
pub struct TagReport {
    pub tag: String,
    pub result: TagResult,
}

/// Outcome of a whole job
#[derive(Debug)]
pub enum JobOutcome {
    /// Both documents were parsed; one report per configured tag, in order
    Compared(Vec<TagReport>),
    /// The job could not run (missing or unparsable file)
    Failed(CompareError),
}

/// Result of running a single job
#[derive(Debug)]
pub struct JobReport {
    /// `"<old_file> -> <new_file>"`
    pub label: String,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub outcome: JobOutcome,
    pub duration: Duration,
}

impl JobReport {
    pub fn tag_reports(&self) -> &[TagReport] {
        match &self.outcome {
            JobOutcome::Compared(reports) => reports,
            JobOutcome::Failed(_) => &[],
        }
    }

    /// Look up the result for `tag`
    pub fn tag(&self, tag: &str) -> Option<&TagResult> {
        self.tag_reports()
            .iter()
            .find(|report| report.tag == tag)
            .map(|report| &report.result)
    }
}

/// Aggregated results of a comparison run
#[derive(Debug)]
pub struct ComparisonResults {
    /// Job reports in configuration order, one per distinct label
    pub reports: Vec<JobReport>,
    pub jobs_compared: usize,
    pub jobs_failed: usize,
    pub tags_compared: usize,
    pub tags_invalid: usize,
    pub additions: usize,
    pub removals: usize,
    pub total_duration: Duration,
}

impl ComparisonResults {
    /// Aggregate individual job reports into a summary
    ///
    /// Reports sharing a label collapse into one: it keeps the position of
    /// the first and the contents of the last.
    pub fn aggregate(reports: Vec<JobReport>, total_duration: Duration) -> Self {
        let mut by_label: IndexMap<String, JobReport> = IndexMap::with_capacity(reports.len());
        for report in reports {
            by_label.insert(report.label.clone(), report);
        }
        let reports: Vec<JobReport> = by_label.into_values().collect();

        let mut results = Self {
            reports: Vec::new(),
            jobs_compared: 0,
            jobs_failed: 0,
            tags_compared: 0,
            tags_invalid: 0,
            additions: 0,
            removals: 0,
            total_duration,
        };

        for report in &reports {
            match &report.outcome {
                JobOutcome::Failed(_) => results.jobs_failed += 1,
                JobOutcome::Compared(tag_reports) => {
                    results.jobs_compared += 1;
                    for tag_report in tag_reports {
                        results.tags_compared += 1;
                        match &tag_report.result {
                            TagResult::Invalid(_) => results.tags_invalid += 1,
                            TagResult::Changes {
                                additions,
                                removals,
                            } => {
                                results.additions += additions.len();
                                results.removals += removals.len();
                            }
                        }
                    }
                }
            }
        }

        results.reports = reports;
        results
    }

    /// Look up a job report by its label
    pub fn get(&self, label: &str) -> Option<&JobReport> {
        self.reports.iter().find(|report| report.label == label)
    }

    pub fn has_changes(&self) -> bool {
        self.additions > 0 || self.removals > 0
    }

    /// Whether any job failed or any tag could not be compared
    pub fn has_failures(&self) -> bool {
        self.jobs_failed > 0 || self.tags_invalid > 0
    }
}

/// Run-level settings for the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Number of jobs allowed to run at the same time
    pub max_concurrent_jobs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 1,
        }
    }
}

/// Compare one tag between two parsed documents
pub fn compare_documents(old_root: &Element, new_root: &Element, tag: &str) -> TagResult {
    let (old, new) = match (locate(old_root, tag), locate(new_root, tag)) {
        (Some(old), Some(new)) => (old, new),
        (None, Some(_)) => return tag_not_found(MissingFrom::Old),
        (Some(_), None) => return tag_not_found(MissingFrom::New),
        (None, None) => return tag_not_found(MissingFrom::Both),
    };

    if old.path != new.path {
        return TagResult::Invalid(InvalidReason::HierarchyMismatch {
            old_path: old.path,
            new_path: new.path,
        });
    }

    let changes = diff(&old.element.children, &new.element.children);
    TagResult::Changes {
        additions: changes.additions.into_iter().cloned().collect(),
        removals: changes.removals.into_iter().cloned().collect(),
    }
}

fn tag_not_found(missing_from: MissingFrom) -> TagResult {
    TagResult::Invalid(InvalidReason::TagNotFound { missing_from })
}

/// Owns the job list and the `old/` and `new/` roots jobs resolve against
pub struct ComparisonManager {
    base_dir: PathBuf,
    old_dir: PathBuf,
    new_dir: PathBuf,
    jobs: Vec<ComparisonJob>,
    config: RunConfig,
}

impl ComparisonManager {
    /// Create a manager with no jobs
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_jobs(base_dir, Vec::new())
    }

    /// Create a manager preloaded with `jobs`
    pub fn with_jobs(base_dir: impl Into<PathBuf>, jobs: Vec<ComparisonJob>) -> Self {
        let base_dir = base_dir.into();
        Self {
            old_dir: base_dir.join(OLD_DIR),
            new_dir: base_dir.join(NEW_DIR),
            base_dir,
            jobs,
            config: RunConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn old_dir(&self) -> &Path {
        &self.old_dir
    }

    pub fn new_dir(&self) -> &Path {
        &self.new_dir
    }

    pub fn jobs(&self) -> &[ComparisonJob] {
        &self.jobs
    }

    pub fn add_job(&mut self, job: ComparisonJob) {
        self.jobs.push(job);
    }

    pub fn add_comparison(
        &mut self,
        old_file: impl Into<String>,
        new_file: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.jobs.push(ComparisonJob::new(old_file, new_file, tags));
    }

    /// Create the `old/` and `new/` directories if they are missing
    pub async fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.old_dir, &self.new_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| CompareError::DirectorySetup {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Append the jobs listed in a configuration file
    ///
    /// On failure nothing is appended and the error is returned for reporting.
    pub async fn load_config_from_file(
        &mut self,
        path: &Path,
    ) -> std::result::Result<usize, ConfigError> {
        match config::load_jobs(path).await {
            Ok(jobs) => {
                let count = jobs.len();
                info!(path = %path.display(), jobs = count, "Loaded comparison configuration");
                self.jobs.extend(jobs);
                Ok(count)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error loading configuration");
                Err(e)
            }
        }
    }

    /// Write the current job list to a configuration file
    pub async fn save_config_to_file(&self, path: &Path) -> std::result::Result<(), ConfigError> {
        config::save_jobs(path, &self.jobs).await?;
        info!(path = %path.display(), jobs = self.jobs.len(), "Saved comparison configuration");
        Ok(())
    }

    /// Run a single job against this manager's directories
    pub async fn run_job(&self, job: &ComparisonJob) -> JobReport {
        run_job_in(&self.old_dir, &self.new_dir, job).await
    }

    /// Run every configured job
    pub async fn run_all_comparisons(&self) -> ComparisonResults {
        let start = Instant::now();

        let reports = if self.config.max_concurrent_jobs <= 1 || self.jobs.len() <= 1 {
            let mut reports = Vec::with_capacity(self.jobs.len());
            for job in &self.jobs {
                reports.push(self.run_job(job).await);
            }
            reports
        } else {
            self.run_concurrently().await
        };

        let results = ComparisonResults::aggregate(reports, start.elapsed());
        info!(
            jobs = results.reports.len(),
            failed = results.jobs_failed,
            tags = results.tags_compared,
            invalid = results.tags_invalid,
            additions = results.additions,
            removals = results.removals,
            "Comparison run finished"
        );
        results
    }

    async fn run_concurrently(&self) -> Vec<JobReport> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            self.config.max_concurrent_jobs,
        ));

        let tasks: Vec<_> = self
            .jobs
            .iter()
            .cloned()
            .map(|job| {
                let semaphore = Arc::clone(&semaphore);
                let old_dir = self.old_dir.clone();
                let new_dir = self.new_dir.clone();

                tokio::spawn(async move {
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return failed_report(
                                &old_dir,
                                &new_dir,
                                &job,
                                CompareError::Concurrency {
                                    details: e.to_string(),
                                },
                                Duration::ZERO,
                            );
                        }
                    };
                    run_job_in(&old_dir, &new_dir, &job).await
                })
            })
            .collect();

        join_all(tasks)
            .await
            .into_iter()
            .zip(&self.jobs)
            .map(|(joined, job)| {
                joined.unwrap_or_else(|e| {
                    warn!(job = %job.label(), error = %e, "Comparison task failed");
                    failed_report(
                        &self.old_dir,
                        &self.new_dir,
                        job,
                        CompareError::Concurrency {
                            details: format!("Task join error: {}", e),
                        },
                        Duration::ZERO,
                    )
                })
            })
            .collect()
    }
}

async fn run_job_in(old_dir: &Path, new_dir: &Path, job: &ComparisonJob) -> JobReport {
    let start = Instant::now();
    let label = job.label();
    let old_path = old_dir.join(&job.old_file);
    let new_path = new_dir.join(&job.new_file);

    info!(job = %label, "Running comparison");

    let (old_root, new_root) = match load_pair(&old_path, &new_path).await {
        Ok(documents) => documents,
        Err(e) => {
            warn!(job = %label, error = %e, "Skipping comparison");
            return failed_report(old_dir, new_dir, job, e, start.elapsed());
        }
    };

    // A tag listed twice is compared and reported once.
    let tags: IndexSet<&String> = job.tags.iter().collect();
    let tag_reports = tags
        .into_iter()
        .map(|tag| {
            let result = compare_documents(&old_root, &new_root, tag);
            match &result {
                TagResult::Invalid(reason) => {
                    warn!(job = %label, tag = %tag, reason = %reason, "Invalid comparison");
                }
                TagResult::Changes {
                    additions,
                    removals,
                } => {
                    debug!(
                        job = %label,
                        tag = %tag,
                        additions = additions.len(),
                        removals = removals.len(),
                        "Compared tag"
                    );
                }
            }
            TagReport {
                tag: tag.clone(),
                result,
            }
        })
        .collect();

    JobReport {
        label,
        old_path,
        new_path,
        outcome: JobOutcome::Compared(tag_reports),
        duration: start.elapsed(),
    }
}

/// Check that both files exist before parsing either, old side first
async fn load_pair(old_path: &Path, new_path: &Path) -> Result<(Element, Element)> {
    for path in [old_path, new_path] {
        if !tokio::fs::try_exists(path).await? {
            return Err(CompareError::MissingFile {
                path: path.to_path_buf(),
            });
        }
    }

    let old_root = load_document(old_path).await?;
    let new_root = load_document(new_path).await?;
    Ok((old_root, new_root))
}

fn failed_report(
    old_dir: &Path,
    new_dir: &Path,
    job: &ComparisonJob,
    error: CompareError,
    duration: Duration,
) -> JobReport {
    JobReport {
        label: job.label(),
        old_path: old_dir.join(&job.old_file),
        new_path: new_dir.join(&job.new_file),
        outcome: JobOutcome::Failed(error),
        duration,
    }
}
