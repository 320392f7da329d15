use std::process::ExitCode;

use anyhow::Context;
use tracing::info;

use xml_compare::{
    Cli, ComparisonJob, ComparisonManager, ComparisonResults, ErrorReporter, Output,
    OutputFormat, RunConfig, Settings, SettingsManager, VerbosityLevel, logging,
};

/// Changes were found and `--fail-on-changes` was given
const EXIT_CHANGES: u8 = 1;
/// A job failed or a tag was invalid and `--fail-on-changes` was given
const EXIT_FAILURES: u8 = 2;
/// Startup failed before any comparison ran
const EXIT_FATAL: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        return ExitCode::from(EXIT_FATAL);
    }

    let settings = match SettingsManager::load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            ErrorReporter::new(VerbosityLevel::Normal).report_config_error(&e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    logging::init(settings.verbosity());

    match run(&cli, &settings).await {
        Ok(results) => exit_code(&results, &settings),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: &Cli, settings: &Settings) -> anyhow::Result<ComparisonResults> {
    let verbosity = settings.verbosity();
    let reporter = ErrorReporter::with_options(verbosity, verbosity == VerbosityLevel::Debug);
    let show_status = verbosity > VerbosityLevel::Quiet;

    let mut manager = ComparisonManager::new(&settings.base_dir).with_config(RunConfig {
        max_concurrent_jobs: settings.concurrency,
    });

    manager
        .ensure_directories()
        .await
        .context("unable to prepare the old/ and new/ directories")?;

    if let (Some(old_file), Some(new_file)) = (&cli.old_file, &cli.new_file) {
        manager.add_comparison(old_file, new_file, cli.get_tags());
    } else if let Some(config_path) = SettingsManager::find_config_file(settings) {
        if show_status {
            eprintln!("Loading configuration from {}...", config_path.display());
        }
        if let Err(e) = manager.load_config_from_file(&config_path).await {
            reporter.report_config_error(&e);
        }
    } else {
        if show_status {
            eprintln!("No configuration file found. Using default comparisons...");
        }
        for job in ComparisonJob::default_jobs() {
            manager.add_job(job);
        }
    }

    if let Some(save_path) = &cli.save_config
        && let Err(e) = manager.save_config_to_file(save_path).await
    {
        reporter.report_config_error(&e);
    }

    if show_status {
        eprintln!("\nRunning XML comparisons...");
    }
    info!(jobs = manager.jobs().len(), base_dir = %manager.base_dir().display(), "Starting run");

    let results = manager.run_all_comparisons().await;

    // The human report names failed jobs itself except in quiet mode.
    if settings.format != OutputFormat::Human || verbosity == VerbosityLevel::Quiet {
        reporter.report_failed_jobs(&results);
    }

    let output = Output::new(verbosity, settings.format);
    let report = output.format_results(&results);
    if !report.is_empty() {
        println!("{}", report);
    }

    Ok(results)
}

fn exit_code(results: &ComparisonResults, settings: &Settings) -> ExitCode {
    if !settings.fail_on_changes {
        return ExitCode::SUCCESS;
    }
    if results.has_failures() {
        ExitCode::from(EXIT_FAILURES)
    } else if results.has_changes() {
        ExitCode::from(EXIT_CHANGES)
    } else {
        ExitCode::SUCCESS
    }
}
