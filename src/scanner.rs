//! One-shot scan of the source folder at startup.
//!
//! Files already sitting in the source folder when the organizer starts are
//! handled here, before the watcher takes over for new arrivals.

use crate::file_organizer::{FileOrganizer, MoveOutcome};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors that abort the initial scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The source folder could not be listed.
    #[error("failed to read source folder {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Tally of what the initial scan did.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Files moved (or that would be moved, in dry-run mode), per destination folder.
    pub moved_by_folder: HashMap<String, usize>,
    /// How many of those needed a timestamped name.
    pub renamed: usize,
    /// Entries with no matching destination, or that were not regular files.
    pub skipped: usize,
    /// Files that could not be moved.
    pub failed: Vec<PathBuf>,
    /// Set when a stop request ended the scan before every entry was visited.
    pub interrupted: bool,
}

impl ScanReport {
    fn record(&mut self, path: PathBuf, outcome: &MoveOutcome) {
        match outcome {
            MoveOutcome::Moved { folder, .. } => {
                *self.moved_by_folder.entry(folder.clone()).or_insert(0) += 1;
            }
            MoveOutcome::Renamed { folder, .. } => {
                *self.moved_by_folder.entry(folder.clone()).or_insert(0) += 1;
                self.renamed += 1;
            }
            MoveOutcome::SkippedNoMatch | MoveOutcome::SkippedNotAFile => self.skipped += 1,
            MoveOutcome::Failed(_) => self.failed.push(path),
        }
    }

    /// Number of files moved, renamed ones included.
    pub fn moved(&self) -> usize {
        self.moved_by_folder.values().sum()
    }

    /// Total number of entries examined.
    pub fn total_processed(&self) -> usize {
        self.moved() + self.skipped + self.failed.len()
    }
}

/// Organizes every entry currently in the source folder, once.
///
/// Entries are visited in directory enumeration order. Subdirectories and
/// unmatched files are skipped; a failed move is logged and the scan goes on.
/// `stop` is checked before each entry: once it is set no further move
/// starts, and the scan ends with "Initial scan interrupted." instead of
/// "Initial scan complete.".
///
/// # Errors
///
/// Returns `ScanError::ReadDir` if the source folder cannot be listed.
pub fn initial_scan(organizer: &FileOrganizer, stop: &AtomicBool) -> Result<ScanReport, ScanError> {
    let source = organizer.source_folder();

    // Snapshot the listing so folders created by the moves are not revisited.
    let paths: Vec<PathBuf> = fs::read_dir(source)
        .map_err(|e| ScanError::ReadDir {
            path: source.to_path_buf(),
            source: e,
        })?
        .flatten()
        .map(|entry| entry.path())
        .collect();

    organizer.announce("Performing initial scan...");

    let mut report = ScanReport::default();
    for path in paths {
        if stop.load(Ordering::SeqCst) {
            report.interrupted = true;
            organizer.announce("Initial scan interrupted.");
            return Ok(report);
        }
        let outcome = organizer.organize(&path);
        report.record(path, &outcome);
    }

    organizer.announce("Initial scan complete.");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity_log::ActivityLog;
    use crate::file_category::DestinationMap;
    use crate::file_organizer::RunOptions;
    use tempfile::TempDir;

    fn organizer_for(base: &std::path::Path) -> (FileOrganizer, crate::activity_log::MemoryLog) {
        let (log, buffer) = ActivityLog::in_memory();
        let map = DestinationMap::new()
            .with_destination("images", [".jpg", ".png"])
            .with_destination("docs", [".pdf"]);
        (
            FileOrganizer::new(base, map, RunOptions::default(), log),
            buffer,
        )
    }

    #[test]
    fn test_scan_empty_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let (organizer, buffer) = organizer_for(temp_dir.path());

        let report = initial_scan(&organizer, &AtomicBool::new(false)).expect("scan failed");

        assert_eq!(report.total_processed(), 0);
        assert_eq!(
            buffer.messages(),
            vec!["Performing initial scan...", "Initial scan complete."]
        );
    }

    #[test]
    fn test_scan_tallies_outcomes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "a").unwrap();
        fs::write(base.join("b.png"), "b").unwrap();
        fs::write(base.join("c.pdf"), "c").unwrap();
        fs::write(base.join("d.txt"), "d").unwrap();
        fs::create_dir(base.join("nested")).unwrap();

        let (organizer, _) = organizer_for(base);
        let report = initial_scan(&organizer, &AtomicBool::new(false)).expect("scan failed");

        assert_eq!(report.moved(), 3);
        assert_eq!(report.moved_by_folder.get("images"), Some(&2));
        assert_eq!(report.moved_by_folder.get("docs"), Some(&1));
        assert_eq!(report.skipped, 2);
        assert!(report.failed.is_empty());
        assert!(!report.interrupted);
        assert_eq!(report.total_processed(), 5);
        assert!(base.join("nested").is_dir());
        assert!(base.join("d.txt").exists());
    }

    #[test]
    fn test_scan_starts_no_moves_once_stopped() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        for i in 0..5 {
            fs::write(base.join(format!("report{}.pdf", i)), "pdf").unwrap();
        }

        let (organizer, buffer) = organizer_for(base);
        let report = initial_scan(&organizer, &AtomicBool::new(true)).expect("scan failed");

        assert!(report.interrupted);
        assert_eq!(report.total_processed(), 0);
        assert!(!base.join("docs").exists());
        assert_eq!(
            fs::read_dir(base).unwrap().count(),
            5,
            "every file should still be in the source folder"
        );
        assert_eq!(
            buffer.messages(),
            vec!["Performing initial scan...", "Initial scan interrupted."]
        );
    }

    #[test]
    fn test_scan_missing_source_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let (organizer, buffer) = organizer_for(&temp_dir.path().join("missing"));

        let result = initial_scan(&organizer, &AtomicBool::new(false));
        assert!(matches!(result, Err(ScanError::ReadDir { .. })));
        assert!(buffer.lines().is_empty());
    }
}
