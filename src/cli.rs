//! Command-line interface module for tidywatch.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration and activity log setup
//! - Initial scan and summary
//! - Running the watcher until Ctrl+C

use crate::activity_log::{ActivityLog, DEFAULT_LOG_FILE};
use crate::config::{DEFAULT_CONFIG_FILE, OrganizerConfig};
use crate::file_organizer::{FileOrganizer, RunOptions};
use crate::output::OutputFormatter;
use crate::scanner::{ScanReport, initial_scan};
use crate::watcher::DirectoryWatcher;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Watch a folder and sort new files into subfolders by extension.
#[derive(Debug, Parser)]
#[command(name = "tidywatch", version, about)]
pub struct Cli {
    /// Echo activity to the console.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Show what would be moved without touching any files.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip organizing files already in the source folder at startup.
    #[arg(short, long)]
    pub no_initial_scan: bool,

    /// Where to append the activity log.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            verbose: self.verbose,
            dry_run: self.dry_run,
        }
    }
}

/// Runs the organizer: load config, scan once, then watch until Ctrl+C.
///
/// Only startup problems are returned as errors. Once the watcher is running,
/// per-file failures go to the activity log and never end the process.
pub fn run(cli: Cli) -> Result<()> {
    let config = OrganizerConfig::load(&cli.config_file)
        .with_context(|| format!("Error loading configuration {}", cli.config_file.display()))?;

    tracing::info!(
        "loaded {} destinations for {}",
        config.destinations.len(),
        config.source_folder.display()
    );
    for destination in config.destinations.iter() {
        tracing::debug!("{} <- {:?}", destination.name, destination.extensions);
    }

    let log = ActivityLog::open(&cli.log_file)
        .with_context(|| format!("Error opening log file {}", cli.log_file.display()))?;

    let organizer = FileOrganizer::new(
        config.source_folder,
        config.destinations,
        cli.run_options(),
        log,
    );

    ensure_source_folder(&organizer)?;

    // Subscribe before scanning so files arriving mid-scan are queued, not missed.
    let watcher = DirectoryWatcher::start(organizer.source_folder())?;
    let stop = watcher.stop_handle();
    let interrupt = stop.clone();
    ctrlc::set_handler(move || interrupt.stop()).context("Failed to set Ctrl+C handler")?;

    if !cli.no_initial_scan {
        let report = initial_scan(&organizer, stop.flag())?;
        if organizer.options().echoes_progress() {
            print_summary(&report);
        }
    }

    // Returns straight away when Ctrl+C arrived during the scan.
    watcher.run(&organizer);
    Ok(())
}

/// Creates the source folder if it does not exist yet.
fn ensure_source_folder(organizer: &FileOrganizer) -> Result<()> {
    let source = organizer.source_folder();
    if source.exists() {
        return Ok(());
    }

    fs::create_dir_all(source)
        .with_context(|| format!("Error creating source folder {}", source.display()))?;
    organizer.announce_status(&format!("Created source folder: {}", source.display()));
    Ok(())
}

fn print_summary(report: &ScanReport) {
    OutputFormatter::summary_table(&report.moved_by_folder, report.skipped, report.failed.len());
    if report.renamed > 0 {
        println!(
            "{} of these {} renamed to avoid overwriting.",
            report.renamed,
            if report.renamed == 1 { "was" } else { "were" }
        );
    }
}
