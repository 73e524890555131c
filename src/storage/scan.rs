use crate::paths::canonical::{file_name, normalize_path, paths_equal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a discovered executable.
///
/// Variants are declared in alphabetical order so the derived `Ord` matches
/// the display sort by kind name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExeKind {
    /// Excluded by folder name, file pattern or unreadable metadata.
    Excluded,
    /// Hidden by the user.
    Hidden,
    /// Candidate (or selected) primary executable.
    #[default]
    MainCandidate,
    /// Below the minimum size.
    SmallExe,
    /// Helper, tool or rule-ignored executable.
    ToolCandidate,
}

impl ExeKind {
    /// Name as shown and stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excluded => "Excluded",
            Self::Hidden => "Hidden",
            Self::MainCandidate => "MainCandidate",
            Self::SmallExe => "SmallExe",
            Self::ToolCandidate => "ToolCandidate",
        }
    }

    /// Counted as a valid executable of its folder.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::MainCandidate | Self::ToolCandidate)
    }

    /// Counted as excluded.
    #[must_use]
    pub const fn is_excluded(self) -> bool {
        matches!(self, Self::Excluded | Self::SmallExe)
    }
}

impl fmt::Display for ExeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExeCandidate {
    /// Absolute canonical path.
    pub exe_path: String,
    /// Display name from version info or the file name.
    pub suggested_name: String,
    /// File size.
    pub size_bytes: u64,
    /// Classification.
    pub kind: ExeKind,
    /// Why the executable got its kind; empty for plain candidates.
    pub reason: String,
    /// Selected as a tool of its folder.
    pub is_tool_selected: bool,
    /// Promoted to main despite an exclusion.
    pub is_main_override: bool,
}

impl ExeCandidate {
    /// A main candidate with no reason yet.
    #[must_use]
    pub fn new(exe_path: &str, suggested_name: &str) -> Self {
        Self {
            exe_path: exe_path.to_string(),
            suggested_name: suggested_name.to_string(),
            ..Self::default()
        }
    }

    /// File name of the executable.
    #[must_use]
    pub fn exe_name(&self) -> &str {
        file_name(&self.exe_path)
    }

    /// Size in MiB with two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mb(&self) -> String {
        format!("{:.2}", self.size_bytes as f64 / 1024.0 / 1024.0)
    }

    /// Sets the kind and reason together.
    pub fn classify(&mut self, kind: ExeKind, reason: impl Into<String>) {
        self.kind = kind;
        self.reason = reason.into();
    }
}

/// Lifecycle of a scanned folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderState {
    /// Rebuilt from disk and holds at least one valid executable.
    #[default]
    New,
    /// Maps to a registered game.
    Known,
    /// Restored from the scan cache.
    Cached,
    /// Rebuilt from disk without any valid executable.
    NoValidExe,
}

/// Where a folder's data came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderSource {
    /// Walked on disk.
    #[default]
    Disk,
    /// Restored from the cache.
    Cache,
    /// Skipped as known without cached data.
    Skipped,
}

impl fmt::Display for FolderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for FolderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One scanned top-level folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameFolderCandidate {
    /// Absolute canonical folder path.
    pub folder_path: String,
    /// Last segment of the folder path.
    pub folder_name: String,
    /// Every executable found below the folder.
    pub exes: Vec<ExeCandidate>,
    /// Path of the selected main executable.
    pub selected_main_exe_path: Option<String>,
    /// Paths of the selected tools.
    pub selected_tool_exe_paths: Vec<String>,
    /// Main and tool candidates.
    pub valid_exe_count: usize,
    /// Excluded and undersized executables.
    pub excluded_exe_count: usize,
    /// Hidden executables.
    pub hidden_exe_count: usize,
    /// Lifecycle state.
    pub state: FolderState,
    /// Origin of the data.
    pub source: FolderSource,
}

impl GameFolderCandidate {
    /// An empty candidate for `folder_path`.
    #[must_use]
    pub fn new(folder_path: &str) -> Self {
        let folder_path = normalize_path(folder_path);
        let folder_name = file_name(&folder_path).to_string();
        Self {
            folder_path,
            folder_name,
            ..Self::default()
        }
    }

    /// File name of the selected main, empty when none.
    #[must_use]
    pub fn selected_main_exe_file(&self) -> &str {
        self.selected_main_exe_path.as_deref().map_or("", file_name)
    }

    /// Finds an executable by path.
    #[must_use]
    pub fn find_exe(&self, path: &str) -> Option<&ExeCandidate> {
        self.exes.iter().find(|exe| paths_equal(&exe.exe_path, path))
    }

    /// Mutable lookup by path.
    pub fn find_exe_mut(&mut self, path: &str) -> Option<&mut ExeCandidate> {
        self.exes.iter_mut().find(|exe| paths_equal(&exe.exe_path, path))
    }

    /// True when `path` is the selected main.
    #[must_use]
    pub fn is_selected_main(&self, path: &str) -> bool {
        self.selected_main_exe_path
            .as_deref()
            .is_some_and(|main| paths_equal(main, path))
    }

    /// True when `path` is a selected tool.
    #[must_use]
    pub fn has_tool(&self, path: &str) -> bool {
        self.selected_tool_exe_paths
            .iter()
            .any(|tool| paths_equal(tool, path))
    }

    /// Adds a selected tool. Returns false when already present.
    pub fn add_tool(&mut self, path: &str) -> bool {
        if self.has_tool(path) {
            return false;
        }
        self.selected_tool_exe_paths.push(normalize_path(path));
        true
    }

    /// Removes a selected tool. Returns false when it was absent.
    pub fn remove_tool(&mut self, path: &str) -> bool {
        let before = self.selected_tool_exe_paths.len();
        self.selected_tool_exe_paths
            .retain(|tool| !paths_equal(tool, path));
        self.selected_tool_exe_paths.len() != before
    }

    /// Recomputes the valid, excluded and hidden counters from the kinds.
    pub fn recount(&mut self) {
        self.valid_exe_count = self.exes.iter().filter(|e| e.kind.is_valid()).count();
        self.excluded_exe_count = self.exes.iter().filter(|e| e.kind.is_excluded()).count();
        self.hidden_exe_count = self
            .exes
            .iter()
            .filter(|e| e.kind == ExeKind::Hidden)
            .count();
    }

    /// Sorts executables by kind, suggested name and path, ignoring case.
    pub fn sort_exes(&mut self) {
        self.exes.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.suggested_name.to_lowercase().cmp(&b.suggested_name.to_lowercase()))
                .then_with(|| a.exe_path.to_lowercase().cmp(&b.exe_path.to_lowercase()))
        });
    }
}

/// Running scan counters. Derived data, never persisted authority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMetrics {
    /// Folders visited.
    pub total_folders: usize,
    /// Folders with at least one valid executable.
    pub folders_with_valid_exe: usize,
    /// Executables listed across all folders.
    pub total_exe_candidates: usize,
    /// Folders with a selected main.
    pub main_selected: usize,
    /// Selected tools across all folders.
    pub tools_selected: usize,
    /// Excluded executables.
    pub excluded: usize,
    /// Hidden executables.
    pub hidden: usize,
    /// Folders restored from the cache.
    pub cached_folders: usize,
    /// Known folders that were not rescanned.
    pub skipped_known_folders: usize,
}

impl ScanMetrics {
    /// Adds one finished folder to the totals.
    pub fn record(&mut self, folder: &GameFolderCandidate) {
        self.total_folders += 1;
        self.total_exe_candidates += folder.exes.len();
        self.excluded += folder.excluded_exe_count;
        self.hidden += folder.hidden_exe_count;
        if folder.valid_exe_count > 0 {
            self.folders_with_valid_exe += 1;
        }
        if folder.selected_main_exe_path.is_some() {
            self.main_selected += 1;
        }
        self.tools_selected += folder.selected_tool_exe_paths.len();
    }
}
