//! Full rebuild of one game folder from disk.

use super::fingerprint::is_exe;
use super::rules::{ScanRules, has_penalized_token};
use super::score::{ScoreInput, score_main_candidate};
use super::version::{VersionInfo, VersionProbe};
use crate::paths::canonical::{
    depth, file_name, file_stem, from_fs_path, normalize_path, parent, relative_to, to_fs_path,
};
use crate::storage::{ExeCandidate, ExeKind, GameFolderCandidate, Registry};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

pub(crate) const REASON_EXCLUDED_FOLDER: &str = "Excluded by folder name";
pub(crate) const REASON_EXCLUDED_PATTERN: &str = "Excluded by executable pattern";
pub(crate) const REASON_NO_METADATA: &str = "Could not read file metadata";
pub(crate) const REASON_HIDDEN: &str = "Path exists in HiddenExecutables";
pub(crate) const REASON_TOOL_NAME: &str = "Filename suggests tool/utility";
pub(crate) const REASON_SELECTED: &str = "Selected as main";
pub(crate) const REASON_NOT_SELECTED: &str = "Not selected as main";
pub(crate) const IGNORED_BY_RULE: &str = "IgnoredByRule";

static NOISE_WORDS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(x64|win64|launcher|shipping|release|final)\b").ok()
});

/// Display name of an executable: the product name, else the file
/// description, else a cleaned-up file stem.
#[must_use]
pub fn suggested_name(version: &VersionInfo, exe_path: &str) -> String {
    for value in [&version.product_name, &version.file_description] {
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }

    let stem = file_stem(exe_path);
    let stripped = NOISE_WORDS
        .as_ref()
        .map_or_else(|| stem.to_string(), |re| re.replace_all(stem, " ").into_owned());
    let cleaned = stripped
        .replace(['_', '.', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        stem.to_string()
    } else {
        cleaned
    }
}

/// Classifies and scores every executable of a folder.
pub struct FolderBuilder<'a> {
    rules: &'a ScanRules,
    probe: &'a dyn VersionProbe,
    hidden: HashSet<String>,
}

impl<'a> FolderBuilder<'a> {
    /// Snapshots the hidden set of `registry`.
    #[must_use]
    pub fn new(rules: &'a ScanRules, probe: &'a dyn VersionProbe, registry: &Registry) -> Self {
        let hidden = registry
            .hidden_executables
            .iter()
            .map(|path| normalize_path(path).to_lowercase())
            .collect();
        Self { rules, probe, hidden }
    }

    fn is_hidden(&self, exe_path: &str) -> bool {
        self.hidden.contains(&exe_path.to_lowercase())
    }

    /// Walks `folder_path` and builds its candidate. The state and source are
    /// left at their defaults.
    #[must_use]
    pub fn build(&self, folder_path: &str) -> GameFolderCandidate {
        let mut folder = GameFolderCandidate::new(folder_path);
        let mut scores: Vec<(usize, f64)> = Vec::new();

        let walker = WalkDir::new(to_fs_path(&folder.folder_path))
            .follow_links(false)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(folder = %folder.folder_path, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_exe(entry.path()) {
                continue;
            }

            let exe_path = from_fs_path(entry.path());
            let version = self.probe.probe(entry.path());
            let mut candidate = ExeCandidate::new(&exe_path, &suggested_name(&version, &exe_path));
            let relative = relative_to(&folder.folder_path, &parent(&exe_path).unwrap_or_default());

            let size = entry.metadata().map(|metadata| metadata.len());
            if let Some(score) = self.classify(&mut candidate, &relative, size.ok(), &version, &folder.folder_name) {
                scores.push((folder.exes.len(), score));
            }
            folder.exes.push(candidate);
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, score) in scores {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        if let Some((winner, _)) = best {
            folder.selected_main_exe_path = Some(folder.exes[winner].exe_path.clone());
            for (index, exe) in folder.exes.iter_mut().enumerate() {
                if index == winner {
                    exe.classify(ExeKind::MainCandidate, REASON_SELECTED);
                } else if exe.kind == ExeKind::MainCandidate {
                    exe.kind = ExeKind::ToolCandidate;
                    if exe.reason.is_empty() {
                        exe.reason = REASON_NOT_SELECTED.to_string();
                    }
                }
            }
        }

        folder.sort_exes();
        folder.recount();
        folder
    }

    /// Applies the classification cascade. Returns the main-candidate score
    /// when the executable competes for main.
    fn classify(
        &self,
        candidate: &mut ExeCandidate,
        relative_dir: &str,
        size: Option<u64>,
        version: &VersionInfo,
        folder_name: &str,
    ) -> Option<f64> {
        let file = file_name(&candidate.exe_path).to_string();

        if self.rules.is_folder_excluded(relative_dir) {
            candidate.classify(ExeKind::Excluded, REASON_EXCLUDED_FOLDER);
            return None;
        }
        if self.rules.is_exe_pattern_excluded(&file) {
            candidate.classify(ExeKind::Excluded, REASON_EXCLUDED_PATTERN);
            return None;
        }

        let rule_reason = self.rules.ignore_rule_reason(&file, relative_dir);
        if let Some(reason) = &rule_reason {
            candidate.classify(ExeKind::ToolCandidate, reason.clone());
        }

        let Some(size) = size else {
            candidate.classify(ExeKind::Excluded, REASON_NO_METADATA);
            return None;
        };
        candidate.size_bytes = size;

        if size < self.rules.min_exe_bytes {
            candidate.classify(
                ExeKind::SmallExe,
                format!("Below MinExeBytes ({})", self.rules.min_exe_bytes),
            );
            return None;
        }
        if self.is_hidden(&candidate.exe_path) {
            candidate.classify(ExeKind::Hidden, REASON_HIDDEN);
            return None;
        }
        if rule_reason.is_some() {
            return None;
        }

        let stem = file_stem(&candidate.exe_path).to_string();
        if has_penalized_token(&stem) {
            candidate.classify(ExeKind::ToolCandidate, REASON_TOOL_NAME);
        } else {
            candidate.classify(ExeKind::MainCandidate, "");
        }

        Some(score_main_candidate(&ScoreInput {
            file_stem: &stem,
            depth: depth(relative_dir),
            size_bytes: size,
            product_name: &version.product_name,
            file_description: &version.file_description,
            folder_name,
        }))
    }
}
