//! Matching scanned folders against registered games.

use crate::paths::TokenResolver;
use crate::paths::canonical::{is_within, normalize_path, parent, paths_equal};
use crate::storage::{GameEntry, GameFolderCandidate, Registry};
use tracing::debug;

/// Resolved main target and working directory of a game, empty when
/// unresolvable.
fn resolved_main(game: &GameEntry, resolver: &TokenResolver<'_>) -> (String, String) {
    let main = &game.launch.main;
    (
        resolver.resolve_or_empty(main.target_path(), &game.install, Some(main)),
        resolver.resolve_or_empty(main.working_directory(), &game.install, Some(main)),
    )
}

/// Lower-case alphanumerics of a display or folder name.
#[must_use]
pub fn normalize_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when a registered game lives in `folder_path`: same game folder, or
/// its exe or resolved main target lies inside the folder.
#[must_use]
pub fn is_known_folder(folder_path: &str, registry: &Registry, resolver: &TokenResolver<'_>) -> bool {
    registry.games.iter().any(|game| {
        let install = &game.install;
        if !install.game_folder_path.trim().is_empty() && paths_equal(&install.game_folder_path, folder_path) {
            return true;
        }
        if !install.exe_path.trim().is_empty() && is_within(&install.exe_path, folder_path) {
            return true;
        }
        let (target, _) = resolved_main(game, resolver);
        !target.is_empty() && is_within(&target, folder_path)
    })
}

/// Fills empty install fields of every game that matches the scanned folder
/// by launch target, working directory or display name. Returns the number of
/// entries changed.
pub fn apply_registry_cross_reference(
    folder: &GameFolderCandidate,
    registry: &mut Registry,
    resolver: &TokenResolver<'_>,
) -> usize {
    let folder_path = normalize_path(&folder.folder_path);
    let folder_name = normalize_name(&folder.folder_name);
    let mut changed = 0;

    for game in &mut registry.games {
        let (target, workdir) = resolved_main(game, resolver);
        let display_name = normalize_name(&game.display_name);
        let matched = (!target.is_empty() && is_within(&target, &folder_path))
            || (!workdir.is_empty() && is_within(&workdir, &folder_path))
            || (!display_name.is_empty() && display_name == folder_name);
        if !matched {
            continue;
        }

        let install = &mut game.install;
        let mut touched = false;
        if install.game_folder_path.trim().is_empty() {
            install.game_folder_path.clone_from(&folder_path);
            touched = true;
        }
        if install.exe_path.trim().is_empty()
            && let Some(main) = &folder.selected_main_exe_path
        {
            install.exe_path = normalize_path(main);
            if install.base_folder.trim().is_empty() {
                install.base_folder.clone_from(&folder_path);
            }
            if install.working_dir.trim().is_empty() {
                install.working_dir = parent(main).unwrap_or_else(|| folder_path.clone());
            }
            touched = true;
        }

        if touched {
            debug!(game = %game.display_name, folder = %folder_path, "backfilled install info");
            changed += 1;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PathRoots;
    use crate::storage::LaunchContract;

    fn roots() -> PathRoots {
        PathRoots::new("D:\\Games", "D:\\Cache", "", "C:\\Relay")
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Half-Life 2: Episode One"), "halflife2episodeone");
        assert_eq!(normalize_name(" -- "), "");
    }

    #[test]
    fn test_known_by_folder_and_exe() {
        let roots = roots();
        let resolver = TokenResolver::new(&roots);

        let mut registry = Registry::default();
        let mut game = GameEntry::new("A");
        game.install.game_folder_path = "d:/games/a".to_string();
        registry.games.push(game);
        let mut game = GameEntry::new("B");
        game.install.exe_path = "D:\\Games\\B\\bin\\b.exe".to_string();
        registry.games.push(game);

        assert!(is_known_folder("D:\\Games\\A", &registry, &resolver));
        assert!(is_known_folder("D:\\Games\\B", &registry, &resolver));
        assert!(!is_known_folder("D:\\Games\\B2", &registry, &resolver));
    }

    #[test]
    fn test_known_by_tokenized_target() {
        let roots = roots();
        let resolver = TokenResolver::new(&roots);

        let mut registry = Registry::default();
        let mut game = GameEntry::new("C");
        game.launch.main = LaunchContract::new("{GamesRoot}\\C\\c.exe", "", "{GamesRoot}\\C");
        registry.games.push(game);

        assert!(is_known_folder("D:\\Games\\C", &registry, &resolver));
        assert!(!is_known_folder("D:\\Games\\CC", &registry, &resolver));
    }

    #[test]
    fn test_cross_reference_backfills_empty_fields_only() {
        let roots = roots();
        let resolver = TokenResolver::new(&roots);

        let mut folder = GameFolderCandidate::new("D:\\Games\\Space Game");
        folder.selected_main_exe_path = Some("D:\\Games\\Space Game\\bin\\sg.exe".to_string());

        let mut registry = Registry::default();
        registry.games.push(GameEntry::new("space-game"));
        let mut pinned = GameEntry::new("Space Game");
        pinned.install.exe_path = "E:\\Elsewhere\\sg.exe".to_string();
        registry.games.push(pinned);
        registry.games.push(GameEntry::new("Unrelated"));

        assert_eq!(apply_registry_cross_reference(&folder, &mut registry, &resolver), 2);

        let install = &registry.games[0].install;
        assert_eq!(install.game_folder_path, "D:\\Games\\Space Game");
        assert_eq!(install.exe_path, "D:\\Games\\Space Game\\bin\\sg.exe");
        assert_eq!(install.base_folder, "D:\\Games\\Space Game");
        assert_eq!(install.working_dir, "D:\\Games\\Space Game\\bin");

        let install = &registry.games[1].install;
        assert_eq!(install.game_folder_path, "D:\\Games\\Space Game");
        assert_eq!(install.exe_path, "E:\\Elsewhere\\sg.exe");

        assert_eq!(registry.games[2].install.game_folder_path, "");

        assert_eq!(apply_registry_cross_reference(&folder, &mut registry, &resolver), 0);
    }

    #[test]
    fn test_cross_reference_by_working_directory() {
        let roots = roots();
        let resolver = TokenResolver::new(&roots);
        let folder = GameFolderCandidate::new("D:\\Games\\W");

        let mut registry = Registry::default();
        let mut game = GameEntry::new("Whatever");
        game.launch.main = LaunchContract::new("", "", "D:\\Games\\W\\data");
        registry.games.push(game);

        assert_eq!(apply_registry_cross_reference(&folder, &mut registry, &resolver), 1);
        assert_eq!(registry.games[0].install.game_folder_path, "D:\\Games\\W");
        assert_eq!(registry.games[0].install.exe_path, "");
    }
}
