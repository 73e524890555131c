use super::scan::{ExeCandidate, GameFolderCandidate};
use crate::paths::canonical::normalize_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted scan results, keyed by folder path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanCache {
    /// On-disk format version.
    pub schema_version: u32,
    /// Resolved scan roots of the last scan.
    pub scan_roots_snapshot: Vec<String>,
    /// Cached folders keyed by lower-cased normalized path.
    pub folders: BTreeMap<String, FolderCacheEntry>,
}

impl Default for ScanCache {
    fn default() -> Self {
        Self {
            schema_version: 1,
            scan_roots_snapshot: Vec::new(),
            folders: BTreeMap::new(),
        }
    }
}

impl ScanCache {
    /// Map key of a folder path.
    #[must_use]
    pub fn key(folder_path: &str) -> String {
        normalize_path(folder_path).to_lowercase()
    }

    /// Cached entry of a folder, if any.
    #[must_use]
    pub fn get(&self, folder_path: &str) -> Option<&FolderCacheEntry> {
        self.folders.get(&Self::key(folder_path))
    }

    /// Stores an entry, replacing the previous one for the same folder.
    pub fn insert(&mut self, entry: FolderCacheEntry) {
        self.folders.insert(Self::key(&entry.folder_path), entry);
    }
}

/// Snapshot of one scanned folder plus the fingerprint it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderCacheEntry {
    /// Absolute canonical folder path.
    pub folder_path: String,
    /// Last segment of the folder path.
    pub folder_name: String,
    /// When the folder was last rebuilt from disk.
    pub last_scanned_utc: DateTime<Utc>,
    /// `"<exe count>:<max exe mtime ticks>"` at scan time.
    pub folder_fingerprint: String,
    /// Selected main at scan time.
    pub selected_main_exe_path: Option<String>,
    /// Executables with their kinds and selections.
    pub exe_candidates: Vec<ExeCandidate>,
}

impl FolderCacheEntry {
    /// Snapshots a freshly built candidate.
    #[must_use]
    pub fn from_candidate(
        folder: &GameFolderCandidate,
        fingerprint: &str,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            folder_path: folder.folder_path.clone(),
            folder_name: folder.folder_name.clone(),
            last_scanned_utc: scanned_at,
            folder_fingerprint: fingerprint.to_string(),
            selected_main_exe_path: folder.selected_main_exe_path.clone(),
            exe_candidates: folder.exes.clone(),
        }
    }

    /// Rebuilds the candidate verbatim. State and source are left for the
    /// caller to set.
    #[must_use]
    pub fn restore(&self) -> GameFolderCandidate {
        let mut folder = GameFolderCandidate {
            folder_path: self.folder_path.clone(),
            folder_name: self.folder_name.clone(),
            exes: self.exe_candidates.clone(),
            selected_main_exe_path: self.selected_main_exe_path.clone(),
            ..GameFolderCandidate::default()
        };
        folder.selected_tool_exe_paths = folder
            .exes
            .iter()
            .filter(|exe| exe.is_tool_selected)
            .map(|exe| exe.exe_path.clone())
            .collect();
        folder.recount();
        folder
    }
}
