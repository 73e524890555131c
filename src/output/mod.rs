//! Output formatting, styling, and progress display for the relay CLI.
//!
//! - Dimmed colors for routine messages
//! - Colored scan summary lines
//! - An in-place progress line while scanning
//! - Verbosity control (quiet, normal, verbose)

mod progress;

use crate::storage::{FolderState, GameFolderCandidate, ScanMetrics};
use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

pub use progress::ScanProgress;

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a verbose debug message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// One summary line for a scanned folder: state, name, then the selected
/// main executable or the reason nothing was selected.
#[must_use]
pub fn folder_line(folder: &GameFolderCandidate) -> String {
    let state = format!("{:<10}", folder.state.to_string());
    let state = match folder.state {
        FolderState::New => state.green(),
        FolderState::NoValidExe => state.yellow(),
        _ => state.dimmed(),
    };

    let detail = match &folder.selected_main_exe_path {
        Some(_) => format!(
            "{} ({} valid, {} excluded)",
            folder.selected_main_exe_file(),
            folder.valid_exe_count,
            folder.excluded_exe_count
        ),
        None if folder.exes.is_empty() => "no executables".to_string(),
        None => format!("no main ({} excluded)", folder.excluded_exe_count),
    };

    format!("{state} {} {}", folder.folder_name.bold(), detail.dimmed())
}

/// Final totals of a scan.
#[must_use]
pub fn metrics_line(metrics: &ScanMetrics) -> String {
    format!(
        "{} folders, {} with a main, {} cached, {} skipped, {} excluded, {} hidden",
        metrics.total_folders,
        metrics.main_selected,
        metrics.cached_folders,
        metrics.skipped_known_folders,
        metrics.excluded,
        metrics.hidden
    )
}
