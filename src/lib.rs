//! tidywatch - watch a folder and sort new files by extension
//!
//! This library provides the pieces of a small file organizer: a YAML
//! configuration mapping destination folders to extensions, a classifier, a
//! mover with collision-safe renaming, a one-shot scan of existing files and a
//! filesystem watcher that organizes files as they appear.

pub mod activity_log;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod scanner;
pub mod watcher;

pub use activity_log::{ActivityLog, MemoryLog};
pub use config::{ConfigError, OrganizerConfig};
pub use file_category::{Destination, DestinationMap};
pub use file_organizer::{FileOrganizer, MoveOutcome, OrganizeError, RunOptions};
pub use scanner::{ScanError, ScanReport, initial_scan};
pub use watcher::{DirectoryWatcher, StopHandle, WatchError, WatchState};
