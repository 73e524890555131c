//! Scan progress reporting and cooperative cancellation.

use crate::storage::{GameFolderCandidate, ScanMetrics};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

/// Observer of a running scan. All methods default to doing nothing.
pub trait ScanReporter {
    /// A scan root is about to be walked.
    fn root_started(&mut self, _root: &str, _folder_count: usize) {}

    /// A folder has been built, restored or skipped.
    fn folder_scanned(&mut self, _folder: &GameFolderCandidate) {}

    /// Totals after the latest folder.
    fn metrics_updated(&mut self, _metrics: &ScanMetrics) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ScanReporter for SilentReporter {}

/// Event sent by [`ChannelReporter`].
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// See [`ScanReporter::root_started`].
    RootStarted {
        /// Resolved root path.
        root: String,
        /// Top-level folders below it.
        folder_count: usize,
    },
    /// See [`ScanReporter::folder_scanned`].
    Folder(Box<GameFolderCandidate>),
    /// See [`ScanReporter::metrics_updated`].
    Metrics(ScanMetrics),
}

/// Forwards events to another thread. Sending never blocks, and a dropped
/// receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: Sender<ScanEvent>,
}

impl ChannelReporter {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub const fn new(sender: Sender<ScanEvent>) -> Self {
        Self { sender }
    }
}

impl ScanReporter for ChannelReporter {
    fn root_started(&mut self, root: &str, folder_count: usize) {
        let _ = self.sender.send(ScanEvent::RootStarted {
            root: root.to_string(),
            folder_count,
        });
    }

    fn folder_scanned(&mut self, folder: &GameFolderCandidate) {
        let _ = self.sender.send(ScanEvent::Folder(Box::new(folder.clone())));
    }

    fn metrics_updated(&mut self, metrics: &ScanMetrics) {
        let _ = self.sender.send(ScanEvent::Metrics(*metrics));
    }
}

/// Shared cancellation flag, checked by the scanner between folders.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once [`cancel`](Self::cancel) was called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_channel_reporter_forwards_events() {
        let (sender, receiver) = mpsc::channel();
        let mut reporter = ChannelReporter::new(sender);

        reporter.root_started("D:\\Games", 2);
        reporter.folder_scanned(&GameFolderCandidate::new("D:\\Games\\A"));
        reporter.metrics_updated(&ScanMetrics {
            total_folders: 1,
            ..ScanMetrics::default()
        });

        let events: Vec<ScanEvent> = receiver.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ScanEvent::RootStarted { folder_count: 2, .. }));
        assert!(matches!(&events[1], ScanEvent::Folder(f) if f.folder_name == "A"));
        assert!(matches!(&events[2], ScanEvent::Metrics(m) if m.total_folders == 1));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (sender, receiver) = mpsc::channel();
        drop(receiver);
        let mut reporter = ChannelReporter::new(sender);
        reporter.metrics_updated(&ScanMetrics::default());
    }
}
