//! Watching the source folder for new files.
//!
//! The `notify` backend calls us on its own thread. That callback does nothing
//! but forward created paths into a bounded channel; [`DirectoryWatcher::run`]
//! drains the channel on the caller's thread and organizes one file at a time.
//! A [`StopHandle`] raises a shared stop flag and wakes the loop through the
//! same channel, which is how Ctrl+C ends both the initial scan and the watch.

use crate::file_organizer::FileOrganizer;
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use thiserror::Error;

/// Capacity of the queue between the notify thread and the organizer loop.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Errors that prevent the watcher from starting.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The notify backend could not be created or could not watch the folder.
    #[error("failed to watch {}: {source}", path.display())]
    Subscribe {
        path: PathBuf,
        source: notify::Error,
    },
}

/// Lifecycle of a [`DirectoryWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Running,
    Stopped,
}

/// Messages consumed by the organizer loop.
#[derive(Debug)]
pub enum WatchMessage {
    /// A file or directory appeared in the watched folder.
    Created(PathBuf),
    /// Stop accepting events and return from [`DirectoryWatcher::run`].
    Stop,
}

/// Requests shutdown of the organizer. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct StopHandle {
    sender: SyncSender<WatchMessage>,
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Asks the organizer to stop.
    ///
    /// A move already under way finishes; no new move starts afterwards,
    /// including ones for events that were queued before the request. Safe to
    /// call more than once.
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
        // A full queue already has messages to wake the loop, and a closed
        // one means the loop has returned.
        let _ = self.sender.try_send(WatchMessage::Stop);
    }

    /// Whether a stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// The shared flag, for work such as [`initial_scan`](crate::scanner::initial_scan)
    /// that polls for cancellation instead of reading the channel.
    pub fn flag(&self) -> &AtomicBool {
        &self.requested
    }
}

/// Non-recursive watch on a single folder.
pub struct DirectoryWatcher {
    source: PathBuf,
    watcher: RecommendedWatcher,
    sender: SyncSender<WatchMessage>,
    receiver: Receiver<WatchMessage>,
    stop_requested: Arc<AtomicBool>,
}

impl DirectoryWatcher {
    /// Installs the watch on `source`.
    ///
    /// Creation events start queueing immediately; they are handled once
    /// [`run`](Self::run) is called.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Subscribe` if the backend cannot be set up or the
    /// folder cannot be watched (for example because it does not exist).
    pub fn start(source: &Path) -> Result<Self, WatchError> {
        let (sender, receiver) = sync_channel(EVENT_QUEUE_CAPACITY);
        let event_sender = sender.clone();

        let subscribe_error = |err: notify::Error| WatchError::Subscribe {
            path: source.to_path_buf(),
            source: err,
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => forward_created(event, &event_sender),
                Err(e) => tracing::warn!("file watcher error: {}", e),
            },
            NotifyConfig::default(),
        )
        .map_err(subscribe_error)?;

        watcher
            .watch(source, RecursiveMode::NonRecursive)
            .map_err(subscribe_error)?;

        Ok(Self {
            source: source.to_path_buf(),
            watcher,
            sender,
            receiver,
            stop_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns a handle that can stop [`run`](Self::run) from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            sender: self.sender.clone(),
            requested: Arc::clone(&self.stop_requested),
        }
    }

    /// Organizes every created file until a stop is requested.
    ///
    /// Blocks the calling thread. Returns at once if a stop was requested
    /// before the call. Always ends in [`WatchState::Stopped`]; the notify
    /// backend is released before returning.
    pub fn run(self, organizer: &FileOrganizer) -> WatchState {
        let Self {
            source,
            watcher,
            sender,
            receiver,
            stop_requested,
        } = self;
        // Stop handles keep their own senders; ours is not needed any more.
        drop(sender);

        let mut state = if stop_requested.load(Ordering::SeqCst) {
            WatchState::Stopped
        } else {
            organizer.announce_status(&format!("Watching '{}' for new files...", source.display()));
            WatchState::Running
        };

        while state == WatchState::Running {
            state = match receiver.recv() {
                Ok(WatchMessage::Created(path)) if !stop_requested.load(Ordering::SeqCst) => {
                    let outcome = organizer.organize(&path);
                    tracing::debug!("{}: {:?}", path.display(), outcome);
                    WatchState::Running
                }
                Ok(_) | Err(_) => WatchState::Stopped,
            };
        }

        drop(watcher);
        organizer.announce_status("File organizer stopped.");
        state
    }
}

fn forward_created(event: Event, sender: &SyncSender<WatchMessage>) {
    if !matches!(event.kind, EventKind::Create(_)) {
        return;
    }
    for path in event.paths {
        if sender.send(WatchMessage::Created(path)).is_err() {
            // Loop has stopped; nothing left to deliver to.
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    #[test]
    fn test_forward_created_only_passes_create_events() {
        let (sender, receiver) = sync_channel(8);

        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/inbox/a.pdf"));
        let modified = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/inbox/b.pdf"));

        forward_created(modified, &sender);
        forward_created(created, &sender);
        drop(sender);

        let messages: Vec<_> = receiver.iter().collect();
        assert_eq!(messages.len(), 1);
        assert!(matches!(&messages[0], WatchMessage::Created(p) if p == Path::new("/inbox/a.pdf")));
    }

    #[test]
    fn test_forward_created_after_receiver_dropped() {
        let (sender, receiver) = sync_channel(1);
        drop(receiver);

        let event = Event::new(EventKind::Create(CreateKind::Any))
            .add_path(PathBuf::from("/inbox/a.pdf"))
            .add_path(PathBuf::from("/inbox/b.pdf"));
        forward_created(event, &sender);
    }

    #[test]
    fn test_stop_handle_raises_shared_flag() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let watcher = DirectoryWatcher::start(temp_dir.path()).expect("watch should start");
        let first = watcher.stop_handle();
        let second = watcher.stop_handle();

        assert!(!second.is_requested());
        first.stop();
        first.stop();
        assert!(second.is_requested());
        assert!(second.flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_queued_events_are_dropped_after_stop() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let watcher = DirectoryWatcher::start(base).expect("watch should start");
        let (log, buffer) = crate::activity_log::ActivityLog::in_memory();
        let map = crate::file_category::DestinationMap::new().with_destination("docs", [".pdf"]);
        let organizer = FileOrganizer::new(
            base,
            map,
            crate::file_organizer::RunOptions::default(),
            log,
        );

        std::fs::write(base.join("late.pdf"), "pdf").unwrap();
        watcher
            .sender
            .send(WatchMessage::Created(base.join("late.pdf")))
            .unwrap();
        watcher.stop_handle().stop();

        assert_eq!(watcher.run(&organizer), WatchState::Stopped);
        assert!(base.join("late.pdf").exists());
        assert!(!base.join("docs").exists());
        assert_eq!(buffer.messages(), vec!["File organizer stopped."]);
    }

    #[test]
    fn test_start_on_missing_folder_fails() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let result = DirectoryWatcher::start(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(WatchError::Subscribe { .. })));
    }
}
