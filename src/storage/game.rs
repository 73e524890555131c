use super::contract::LaunchSettings;
use crate::identity;
use crate::paths::PathRoots;
use crate::paths::canonical::{normalize_path, paths_equal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Where a game lives on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallInfo {
    /// Scanned top-level folder of the game.
    pub game_folder_path: String,
    /// Folder the entry was registered from.
    pub base_folder: String,
    /// Absolute path of the primary executable.
    pub exe_path: String,
    /// Absolute paths of registered tool executables.
    pub tool_exe_paths: Vec<String>,
    /// Default arguments.
    pub args: String,
    /// Default working directory.
    pub working_dir: String,
}

impl InstallInfo {
    /// Install info rooted at one folder, as used while committing scans.
    #[must_use]
    pub fn for_folder(folder: &str) -> Self {
        Self {
            game_folder_path: folder.to_string(),
            base_folder: folder.to_string(),
            ..Self::default()
        }
    }

    /// Value of `{GameFolder}`: the game folder, else the base folder.
    #[must_use]
    pub fn game_folder(&self) -> &str {
        if self.game_folder_path.trim().is_empty() {
            &self.base_folder
        } else {
            &self.game_folder_path
        }
    }
}

/// Outcome of the last launch attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastResult {
    /// Never launched or validated.
    #[default]
    Unknown,
    /// The target resolved and exists.
    #[serde(rename = "OK")]
    Ok,
    /// The resolved target does not exist.
    MissingExe,
    /// Spawning the process failed.
    LaunchFailed,
}

impl fmt::Display for LastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unknown => "Unknown",
            Self::Ok => "OK",
            Self::MissingExe => "MissingExe",
            Self::LaunchFailed => "LaunchFailed",
        };
        f.write_str(text)
    }
}

/// Usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsInfo {
    /// Estimated install size.
    pub estimated_bytes: u64,
    /// Last successful launch.
    pub last_played_utc: Option<DateTime<Utc>>,
    /// Last time the target was checked.
    pub last_validated_utc: Option<DateTime<Utc>>,
    /// Outcome of the last launch attempt.
    pub last_result: LastResult,
}

/// One registered game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameEntry {
    /// Stable unique key.
    pub game_key: Uuid,
    /// Launch identity of the main contract; empty until first computed.
    pub launch_key: String,
    /// Name shown to the user.
    pub display_name: String,
    /// Install location.
    pub install: InstallInfo,
    /// Launch contracts and preferences.
    pub launch: LaunchSettings,
    /// Usage statistics.
    pub stats: StatsInfo,
}

impl Default for GameEntry {
    fn default() -> Self {
        Self::new("Game")
    }
}

impl GameEntry {
    /// A fresh entry with a random key.
    #[must_use]
    pub fn new(display_name: &str) -> Self {
        Self {
            game_key: Uuid::new_v4(),
            launch_key: String::new(),
            display_name: display_name.to_string(),
            install: InstallInfo::default(),
            launch: LaunchSettings::default(),
            stats: StatsInfo::default(),
        }
    }

    /// Computes and stores the launch key if it is missing. Returns true when
    /// the entry changed.
    pub fn ensure_launch_key(&mut self, roots: &PathRoots) -> bool {
        if !self.launch_key.trim().is_empty() {
            return false;
        }
        self.launch_key = identity::build_launch_key_for_game(self, roots);
        true
    }
}

/// All registered games plus the globally hidden executables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registry {
    /// On-disk format version.
    pub schema_version: u32,
    /// Absolute paths the user hid from every scan.
    pub hidden_executables: Vec<String>,
    /// Registered games.
    pub games: Vec<GameEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            schema_version: 1,
            hidden_executables: Vec::new(),
            games: Vec::new(),
        }
    }
}

impl Registry {
    /// Looks up a game by key.
    #[must_use]
    pub fn find(&self, key: Uuid) -> Option<&GameEntry> {
        self.games.iter().find(|game| game.game_key == key)
    }

    /// Mutable lookup by key.
    pub fn find_mut(&mut self, key: Uuid) -> Option<&mut GameEntry> {
        self.games.iter_mut().find(|game| game.game_key == key)
    }

    /// True when `path` is in the hidden set.
    #[must_use]
    pub fn is_hidden(&self, path: &str) -> bool {
        self.hidden_executables
            .iter()
            .any(|hidden| paths_equal(hidden, path))
    }

    /// Adds `path` to the hidden set. Returns false when it was empty or
    /// already hidden.
    pub fn hide(&mut self, path: &str) -> bool {
        if path.trim().is_empty() || self.is_hidden(path) {
            return false;
        }
        self.hidden_executables.push(normalize_path(path));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_folder_fallback() {
        let mut install = InstallInfo {
            base_folder: "C:\\Base".to_string(),
            ..InstallInfo::default()
        };
        assert_eq!(install.game_folder(), "C:\\Base");
        install.game_folder_path = "C:\\Game".to_string();
        assert_eq!(install.game_folder(), "C:\\Game");
    }

    #[test]
    fn test_hide_is_idempotent() {
        let mut registry = Registry::default();
        assert!(registry.hide("C:/G/crash.exe"));
        assert!(!registry.hide("c:\\g\\CRASH.exe"));
        assert!(!registry.hide(" "));
        assert_eq!(registry.hidden_executables, vec!["C:\\G\\crash.exe".to_string()]);
    }

    #[test]
    fn test_last_result_serialization() {
        let json = serde_json::to_string(&LastResult::Ok).unwrap();
        assert_eq!(json, "\"OK\"");
        let parsed: LastResult = serde_json::from_str("\"MissingExe\"").unwrap();
        assert_eq!(parsed, LastResult::MissingExe);
    }

    #[test]
    fn test_ensure_launch_key_only_once() {
        let roots = PathRoots::new("D:\\Games", "", "", "");
        let mut game = GameEntry::new("Foo");
        game.install.exe_path = "D:\\Games\\Foo\\foo.exe".to_string();

        assert!(game.ensure_launch_key(&roots));
        let key = game.launch_key.clone();
        assert_eq!(key.len(), 64);
        assert!(!game.ensure_launch_key(&roots));
        assert_eq!(game.launch_key, key);
    }
}
