//! In-place scan progress line for the terminal.

use crate::scanner::ScanReporter;
use crate::storage::{GameFolderCandidate, ScanMetrics};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// A progress line that updates in place on TTY terminals.
///
/// Shows completion percentage and current/total counts per scan root:
/// "Scanning D:\Games: 100% (6/6), done."
pub struct ScanProgress {
    /// Root currently being scanned
    root: String,
    /// Folders below the current root
    total: usize,
    /// Folders finished below the current root
    current: usize,
    /// Whether stderr is a TTY (enables inline updating)
    is_tty: bool,
    /// Last displayed percentage (to avoid redundant updates)
    last_percent: u8,
    /// Whether a line for the current root is open
    started: bool,
    /// Totals reported by the scanner
    metrics: ScanMetrics,
}

impl ScanProgress {
    /// Creates a progress display. On a non-TTY stderr it stays silent.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tty(io::stderr().is_terminal())
    }

    fn with_tty(is_tty: bool) -> Self {
        Self {
            root: String::new(),
            total: 0,
            current: 0,
            is_tty,
            last_percent: 0,
            started: false,
            metrics: ScanMetrics::default(),
        }
    }

    /// Latest totals.
    #[must_use]
    pub const fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Closes the open line with a "done" suffix.
    pub fn finish(&mut self) {
        if self.is_tty && self.started {
            self.display_final();
        }
        self.started = false;
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current as f64 / self.total as f64) * 100.0) as u8
    }

    fn display(&self) {
        if !self.is_tty || self.total == 0 {
            return;
        }

        eprint!(
            "\r{} {}: {}% ({}/{})",
            "Scanning".dimmed(),
            self.root.dimmed(),
            self.percent().to_string().dimmed(),
            self.current,
            self.total
        );
        let _ = io::stderr().flush();
    }

    fn display_final(&self) {
        eprintln!(
            "\r{} {}: 100% ({}/{}), done.",
            "Scanning".dimmed(),
            self.root.dimmed(),
            self.total,
            self.total
        );
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanReporter for ScanProgress {
    fn root_started(&mut self, root: &str, folder_count: usize) {
        self.finish();
        self.root = root.to_string();
        self.total = folder_count;
        self.current = 0;
        self.last_percent = 0;
        if self.is_tty && folder_count > 0 {
            self.display();
            self.started = true;
        }
    }

    fn folder_scanned(&mut self, _folder: &GameFolderCandidate) {
        self.current = (self.current + 1).min(self.total);
        let percent = self.percent();
        if percent != self.last_percent {
            self.last_percent = percent;
            self.display();
        }
    }

    fn metrics_updated(&mut self, metrics: &ScanMetrics) {
        self.metrics = *metrics;
    }
}

impl Drop for ScanProgress {
    fn drop(&mut self) {
        if self.is_tty && self.started && self.current < self.total {
            eprintln!();
        }
    }
}
