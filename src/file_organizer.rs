//! Moving files into their destination folders.
//!
//! [`FileOrganizer`] takes one path at a time, classifies it by extension,
//! resolves the destination folder, picks a collision-free name and moves the
//! file. Per-file failures never escape: they are written to the activity log
//! and reported as [`MoveOutcome::Failed`].

use crate::activity_log::ActivityLog;
use crate::config::expand_home;
use crate::file_category::DestinationMap;
use crate::output::OutputFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Format of the suffix inserted into renamed duplicates.
pub const RENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Flags fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Echo activity to the console.
    pub verbose: bool,
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
}

impl RunOptions {
    /// Whether progress lines are echoed to the console.
    pub fn echoes_progress(&self) -> bool {
        self.verbose || self.dry_run
    }
}

/// Errors that can occur while moving a single file.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create the destination directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },
    /// Failed to move the file to its destination.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The path has no final name component.
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
}

/// Result of organizing a single file.
#[derive(Debug)]
pub enum MoveOutcome {
    /// Moved under its original name.
    Moved { folder: String, destination: PathBuf },
    /// A file of the same name was already there; moved under a timestamped name.
    Renamed { folder: String, destination: PathBuf },
    /// No destination accepts the file's extension.
    SkippedNoMatch,
    /// The path is not a regular file (a directory, or it no longer exists).
    SkippedNotAFile,
    /// Directory creation or the move itself failed; the file was left in place.
    Failed(OrganizeError),
}

impl MoveOutcome {
    /// The destination folder name for moved and renamed files.
    pub fn folder(&self) -> Option<&str> {
        match self {
            Self::Moved { folder, .. } | Self::Renamed { folder, .. } => Some(folder.as_str()),
            _ => None,
        }
    }

    /// The final path for moved and renamed files.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::Moved { destination, .. } | Self::Renamed { destination, .. } => {
                Some(destination.as_path())
            }
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedNoMatch | Self::SkippedNotAFile)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Console treatment of an announced line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Echo {
    /// Per-file and scan progress, marked in dry-run mode.
    Progress,
    /// Startup and shutdown lines, never marked.
    Status,
}

/// Classifies files and moves them into destination folders under a source folder.
#[derive(Debug, Clone)]
pub struct FileOrganizer {
    source_folder: PathBuf,
    destinations: DestinationMap,
    options: RunOptions,
    log: ActivityLog,
}

impl FileOrganizer {
    pub fn new(
        source_folder: impl Into<PathBuf>,
        destinations: DestinationMap,
        options: RunOptions,
        log: ActivityLog,
    ) -> Self {
        Self {
            source_folder: source_folder.into(),
            destinations,
            options,
            log,
        }
    }

    pub fn source_folder(&self) -> &Path {
        &self.source_folder
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Logs a progress line and echoes it when verbose or dry-run.
    ///
    /// In dry-run mode the console copy carries the `[DRY RUN] ` marker.
    pub fn announce(&self, message: &str) {
        self.echo(message, Echo::Progress);
    }

    /// Logs a lifecycle line and echoes it, unmarked, when verbose or dry-run.
    pub fn announce_status(&self, message: &str) {
        self.echo(message, Echo::Status);
    }

    fn echo(&self, message: &str, kind: Echo) {
        self.log.info(message);
        if let Some(line) = self.console_line(message, kind) {
            OutputFormatter::progress(&line, self.marks_dry_run(kind));
        }
    }

    /// The console copy of `message`, or `None` when nothing is echoed.
    fn console_line(&self, message: &str, kind: Echo) -> Option<String> {
        if !self.options.echoes_progress() {
            return None;
        }
        if self.marks_dry_run(kind) {
            Some(OutputFormatter::dry_run_line(message))
        } else {
            Some(message.to_string())
        }
    }

    fn marks_dry_run(&self, kind: Echo) -> bool {
        self.options.dry_run && kind == Echo::Progress
    }

    /// Resolves a destination folder name to a directory.
    ///
    /// A leading `~` is expanded first. Absolute names are then used as-is;
    /// relative names are joined onto the source folder.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use tidywatch::activity_log::ActivityLog;
    /// use tidywatch::file_category::DestinationMap;
    /// use tidywatch::file_organizer::{FileOrganizer, RunOptions};
    ///
    /// let (log, _) = ActivityLog::in_memory();
    /// let organizer =
    ///     FileOrganizer::new("/inbox", DestinationMap::new(), RunOptions::default(), log);
    ///
    /// assert_eq!(organizer.resolve_destination_dir("docs"), Path::new("/inbox/docs"));
    /// assert_eq!(organizer.resolve_destination_dir("/srv/docs"), Path::new("/srv/docs"));
    /// ```
    pub fn resolve_destination_dir(&self, folder_name: &str) -> PathBuf {
        let folder = expand_home(Path::new(folder_name));
        if folder.is_absolute() {
            folder
        } else {
            self.source_folder.join(folder)
        }
    }

    /// Classifies `file_path` and moves it into its destination folder.
    ///
    /// Never fails: errors are logged and returned as [`MoveOutcome::Failed`].
    /// In dry-run mode nothing on disk changes, but the outcome still reports
    /// where the file would have gone.
    pub fn organize(&self, file_path: &Path) -> MoveOutcome {
        let is_file = fs::metadata(file_path).is_ok_and(|m| m.is_file());
        if !is_file {
            return MoveOutcome::SkippedNotAFile;
        }

        let Some(folder) = self.destinations.classify_path(file_path) else {
            return MoveOutcome::SkippedNoMatch;
        };

        let Some(file_name) = file_path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return MoveOutcome::Failed(OrganizeError::NoFileName(file_path.to_path_buf()));
        };

        let dest_dir = self.resolve_destination_dir(folder);

        if !self.options.dry_run
            && let Err(source) = fs::create_dir_all(&dest_dir)
        {
            self.report_failure(&file_name, &dest_dir, &source);
            return MoveOutcome::Failed(OrganizeError::CreateDirectory {
                path: dest_dir,
                source,
            });
        }

        let candidate = dest_dir.join(&file_name);
        let (destination, renamed) = if candidate.exists() {
            let timestamp = chrono::Local::now()
                .format(RENAME_TIMESTAMP_FORMAT)
                .to_string();
            let new_name = timestamped_name(Path::new(&file_name), &timestamp);
            self.announce(&format!(
                "Duplicate file: '{}'. Renaming to '{}'. Moving to '{}'.",
                file_name,
                new_name,
                dest_dir.display()
            ));
            (dest_dir.join(new_name), true)
        } else {
            self.announce(&format!(
                "Moving '{}' to '{}'.",
                file_name,
                dest_dir.display()
            ));
            (candidate, false)
        };

        if !self.options.dry_run {
            if let Err(source) = move_file(file_path, &destination) {
                self.report_failure(&file_name, &dest_dir, &source);
                return MoveOutcome::Failed(OrganizeError::Move {
                    from: file_path.to_path_buf(),
                    to: destination,
                    source,
                });
            }

            let message = format!(
                "Successfully moved '{}' to '{}'.",
                file_name,
                dest_dir.display()
            );
            self.log.info(&message);
            if self.options.verbose {
                OutputFormatter::success(&message);
            }
        }

        let folder = folder.to_string();
        if renamed {
            MoveOutcome::Renamed {
                folder,
                destination,
            }
        } else {
            MoveOutcome::Moved {
                folder,
                destination,
            }
        }
    }

    fn report_failure(&self, file_name: &str, dest_dir: &Path, error: &io::Error) {
        let message = format!(
            "Error moving '{}' to '{}': {}",
            file_name,
            dest_dir.display(),
            error
        );
        self.log.error(&message);
        if self.options.verbose {
            OutputFormatter::failure(&message);
        }
    }
}

/// Inserts `_<timestamp>` between a file's stem and its extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tidywatch::file_organizer::timestamped_name;
///
/// assert_eq!(
///     timestamped_name(Path::new("report.pdf"), "20251109143052"),
///     "report_20251109143052.pdf"
/// );
/// assert_eq!(
///     timestamped_name(Path::new("Makefile"), "20251109143052"),
///     "Makefile_20251109143052"
/// );
/// ```
pub fn timestamped_name(file_name: &Path, timestamp: &str) -> String {
    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.extension() {
        Some(ext) => format!("{}_{}.{}", stem, timestamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, timestamp),
    }
}

/// Moves a file, falling back to copy and delete across filesystems.
///
/// Never replaces an existing file: if `to` is already taken the move fails
/// with `ErrorKind::AlreadyExists` and `from` is left alone.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                "rename {} -> {} crosses devices, copying instead",
                from.display(),
                to.display()
            );
            fs::copy(from, to)
                .and_then(|_| fs::remove_file(from))
                .map_err(|e| discard_partial_copy(to, e))
        }
        Err(e) => Err(e),
    }
}

/// Removes whatever a failed copy left at `to` and hands back the original error.
fn discard_partial_copy(to: &Path, error: io::Error) -> io::Error {
    if let Err(cleanup) = fs::remove_file(to)
        && cleanup.kind() != io::ErrorKind::NotFound
    {
        tracing::warn!("could not remove partial copy {}: {}", to.display(), cleanup);
    }
    error
}
