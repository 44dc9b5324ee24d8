//! dupescout - concurrent duplicate file finder
//!
//! Files are bucketed by size, narrowed with a quick head/tail digest and
//! confirmed with a full content digest. Both hashing stages run on a
//! bounded worker pool and share one set of atomic statistics.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, Stats};
use crate::error::ExitCode;
use crate::output::write_report;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::Walker;

/// Run one scan as described by the parsed command line.
///
/// # Errors
///
/// Returns an error for invalid configuration, unusable roots, fatal engine
/// errors and report write failures. Unreadable files are not errors; they
/// surface as [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let handler = signal::install_handler().context("Failed to install Ctrl+C handler")?;

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(!cli.show_progress()));
    let stats = Arc::new(Stats::new());

    let walker = Walker::new(cli.paths.clone(), config.walker_config()?)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::clone(&progress));
    let buckets = walker
        .collect_buckets(&stats)
        .context("Failed to scan directories")?;

    let finder = DuplicateFinder::new(
        config
            .finder_config()
            .with_shutdown_flag(handler.get_flag())
            .with_progress_callback(progress),
    );
    let report = finder
        .find(buckets, &stats)
        .context("Duplicate detection failed")?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_report(&report, cli.format, &mut writer)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_report(&report, cli.format, &mut stdout).context("Failed to write report")?;
        }
    }

    Ok(ExitCode::for_report(&report))
}
