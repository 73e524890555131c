//! Interactive edits of scan results and committing them to the registry.
//!
//! Every operation works on values the caller already holds and is safe to
//! repeat. Nothing here touches the disk; the caller persists the registry.

use super::classify::{IGNORED_BY_RULE, REASON_HIDDEN, REASON_NOT_SELECTED, REASON_SELECTED};
use crate::identity;
use crate::paths::canonical::{contains_ignore_case, normalize_path, parent, paths_equal};
use crate::paths::{PathRoots, PathTokenizer};
use crate::storage::{ExeKind, GameEntry, GameFolderCandidate, InstallInfo, LaunchContract, Registry};
use tracing::{debug, info};

const MAIN_OVERRIDE: &str = "MainOverride";

/// Hides an executable everywhere: adds it to the registry's hidden set and
/// re-tags it `Hidden` in `folders`, dropping any main or tool selection.
///
/// Returns true when the hidden set grew.
pub fn hide_executable(registry: &mut Registry, folders: &mut [GameFolderCandidate], exe_path: &str) -> bool {
    if exe_path.trim().is_empty() {
        return false;
    }
    let added = registry.hide(exe_path);

    for folder in folders.iter_mut() {
        let Some(exe) = folder.find_exe_mut(exe_path) else {
            continue;
        };
        exe.classify(ExeKind::Hidden, REASON_HIDDEN);
        exe.is_tool_selected = false;
        exe.is_main_override = false;

        if folder.is_selected_main(exe_path) {
            folder.selected_main_exe_path = None;
        }
        folder.remove_tool(exe_path);
        folder.recount();
    }

    if added {
        info!(exe = %normalize_path(exe_path), "hid executable");
    }
    added
}

/// Makes `exe_path` the folder's main executable.
///
/// The previous main becomes a tool. An undersized or rule-ignored pick is
/// flagged as an override and keeps its original reason with
/// `MainOverride` appended. Hidden or unknown executables are refused.
pub fn set_main(folder: &mut GameFolderCandidate, exe_path: &str) -> bool {
    let Some(index) = folder.exes.iter().position(|e| paths_equal(&e.exe_path, exe_path)) else {
        return false;
    };
    if folder.exes[index].kind == ExeKind::Hidden {
        return false;
    }

    let chosen = folder.exes[index].exe_path.clone();
    folder.selected_main_exe_path = Some(chosen.clone());
    folder.remove_tool(&chosen);

    for (position, other) in folder.exes.iter_mut().enumerate() {
        if position == index || other.kind != ExeKind::MainCandidate {
            continue;
        }
        other.kind = ExeKind::ToolCandidate;
        if other.reason.is_empty() || other.reason == REASON_SELECTED {
            other.reason = REASON_NOT_SELECTED.to_string();
        }
    }

    let exe = &mut folder.exes[index];
    exe.is_tool_selected = false;
    let overridden = exe.kind == ExeKind::SmallExe
        || contains_ignore_case(&exe.reason, "MinExeBytes")
        || contains_ignore_case(&exe.reason, IGNORED_BY_RULE);
    if overridden {
        exe.is_main_override = true;
        if exe.reason.is_empty() {
            exe.reason = MAIN_OVERRIDE.to_string();
        } else if !contains_ignore_case(&exe.reason, MAIN_OVERRIDE) {
            exe.reason = format!("{}; {MAIN_OVERRIDE}", exe.reason);
        }
    } else if exe.reason.is_empty() || exe.reason == REASON_NOT_SELECTED {
        exe.reason = REASON_SELECTED.to_string();
    }
    exe.kind = ExeKind::MainCandidate;

    folder.recount();
    true
}

/// Selects or deselects a tool. Selecting the current main or an unknown
/// executable is refused; deselecting always succeeds.
pub fn toggle_tool(folder: &mut GameFolderCandidate, exe_path: &str, selected: bool) -> bool {
    if selected && folder.is_selected_main(exe_path) {
        return false;
    }
    if folder.find_exe(exe_path).is_none() {
        return false;
    }

    if selected {
        folder.add_tool(exe_path);
    } else {
        folder.remove_tool(exe_path);
    }

    if let Some(exe) = folder.find_exe_mut(exe_path) {
        exe.is_tool_selected = selected;
        if selected && !matches!(exe.kind, ExeKind::Excluded | ExeKind::Hidden) {
            exe.kind = ExeKind::ToolCandidate;
        }
    }

    folder.recount();
    true
}

/// Selected tools of a folder, normalized and without duplicates.
fn selected_tools(folder: &GameFolderCandidate) -> Vec<String> {
    let mut tools: Vec<String> = Vec::new();
    for tool in &folder.selected_tool_exe_paths {
        let tool = normalize_path(tool);
        if !tools.iter().any(|known| paths_equal(known, &tool)) {
            tools.push(tool);
        }
    }
    tools
}

/// Stores tool paths and their tokenized contracts on an entry.
fn store_tools(game: &mut GameEntry, tools: Vec<String>, folder_path: &str, tokenizer: &PathTokenizer<'_>) {
    for tool in &tools {
        let workdir = parent(tool).unwrap_or_else(|| folder_path.to_string());
        let contract = LaunchContract::new(
            tokenizer.tokenize(tool, &game.install),
            "",
            tokenizer.tokenize(&workdir, &game.install),
        );
        game.launch.set_tool(tool, contract);
    }
    game.install.tool_exe_paths = tools;
}

/// Index of the registered game a commit should update.
fn find_commit_target(registry: &Registry, launch_key: &str, folder_path: &str, main_exe: &str) -> Option<usize> {
    let games = &registry.games;
    games
        .iter()
        .position(|g| identity::is_match(&g.launch_key, launch_key))
        .or_else(|| {
            games.iter().position(|g| {
                !g.install.game_folder_path.trim().is_empty()
                    && paths_equal(&g.install.game_folder_path, folder_path)
            })
        })
        .or_else(|| {
            games.iter().position(|g| {
                identity::prefer_exe_path_fallback(g.launch.main.arguments())
                    && !g.install.exe_path.trim().is_empty()
                    && paths_equal(&g.install.exe_path, main_exe)
            })
        })
}

/// Registers the folder's selected main (and tools), updating the matching
/// entry or creating one. Returns false when no main is selected.
pub fn add_main_to_registry(folder: &GameFolderCandidate, registry: &mut Registry, roots: &PathRoots) -> bool {
    let Some(main) = folder.selected_main_exe_path.as_deref() else {
        return false;
    };
    if main.trim().is_empty() {
        return false;
    }

    let main_exe = normalize_path(main);
    let folder_path = normalize_path(&folder.folder_path);
    let workdir = parent(&main_exe).unwrap_or_else(|| folder_path.clone());

    let tokenizer = PathTokenizer::new(roots);
    let scope = InstallInfo::for_folder(&folder_path);
    let probe_key = identity::build_launch_key(
        &tokenizer.tokenize(&main_exe, &scope),
        "",
        &tokenizer.tokenize(&workdir, &scope),
    );

    let index = if let Some(index) = find_commit_target(registry, &probe_key, &folder_path, &main_exe) {
        index
    } else {
        let name = if folder.folder_name.trim().is_empty() {
            "Game"
        } else {
            &folder.folder_name
        };
        registry.games.push(GameEntry::new(name));
        registry.games.len() - 1
    };
    let game = &mut registry.games[index];

    game.install.game_folder_path.clone_from(&folder_path);
    game.install.base_folder.clone_from(&folder_path);
    game.install.exe_path.clone_from(&main_exe);
    game.install.working_dir.clone_from(&workdir);

    game.launch.main = LaunchContract::new(
        tokenizer.tokenize(&main_exe, &game.install),
        game.install.args.clone(),
        tokenizer.tokenize(&workdir, &game.install),
    );
    store_tools(game, selected_tools(folder), &folder_path, &tokenizer);
    game.launch_key = identity::build_launch_key_for_game(game, roots);

    debug!(game = %game.display_name, key = %game.launch_key, "committed main");
    true
}

/// Commits every folder's main. Returns `(added, skipped)`; folders without a
/// main are skipped.
pub fn add_all_main_to_registry(
    folders: &[GameFolderCandidate],
    registry: &mut Registry,
    roots: &PathRoots,
) -> (usize, usize) {
    folders
        .iter()
        .fold((0, 0), |(added, skipped), folder| {
            if add_main_to_registry(folder, registry, roots) {
                (added + 1, skipped)
            } else {
                (added, skipped + 1)
            }
        })
}

/// Replaces the tool set of the entry registered for this folder. Returns
/// false when no entry matches.
pub fn add_tools_to_registry(folder: &GameFolderCandidate, registry: &mut Registry, roots: &PathRoots) -> bool {
    let folder_path = normalize_path(&folder.folder_path);
    let main = folder.selected_main_exe_path.as_deref().unwrap_or_default();

    let Some(game) = registry.games.iter_mut().find(|g| {
        (!g.install.game_folder_path.trim().is_empty() && paths_equal(&g.install.game_folder_path, &folder_path))
            || (!main.trim().is_empty() && paths_equal(&g.install.exe_path, main))
    }) else {
        return false;
    };

    let tokenizer = PathTokenizer::new(roots);
    store_tools(game, selected_tools(folder), &folder_path, &tokenizer);
    true
}
