mod common;

use anyhow::Result;
use common::{MB, TestLibrary, folder};
use relay::identity::build_launch_key_for_game;
use relay::launcher::{ExitCode, LaunchError, LaunchResolver};
use relay::paths::{PathRoots, ResolveWarning, TokenResolver};
use relay::scanner::{ScanOptions, add_main_to_registry, add_tools_to_registry, toggle_tool};
use relay::storage::{InstallInfo, LastResult, LaunchContract, Registry, ScanCache};

#[test]
fn test_game_folder_token_needs_game_folder() {
    let roots = PathRoots::new("D:\\Games", "D:\\Cache", "", "C:\\Relay");
    let resolver = TokenResolver::new(&roots);
    let contract = LaunchContract::new("{GameFolder}\\bin\\x.exe", "", "");

    let unset = resolver.resolve(contract.target_path(), &InstallInfo::default(), Some(&contract));
    let warning = unset.unwrap_err();
    assert!(matches!(warning, ResolveWarning::UnresolvedToken { .. }));
    assert!(warning.to_string().contains("{GameFolder}\\bin\\x.exe"));

    let install = InstallInfo::for_folder("C:\\Games\\Foo");
    let target = resolver.resolve(contract.target_path(), &install, Some(&contract));
    assert_eq!(target.unwrap(), "C:\\Games\\Foo\\bin\\x.exe");
}

#[test]
fn test_scan_commit_and_launch() -> Result<()> {
    let lib = TestLibrary::new()?;
    lib.file("Games/Space Game/bin/space.exe", 30 * MB);
    lib.file("Games/Space Game/tools/editor.exe", 2 * MB);

    let mut registry = Registry::default();
    let outcome = lib.scan(ScanOptions::default(), &mut registry, &mut ScanCache::default());
    let space = folder(&outcome, "Space Game");
    assert_eq!(space.selected_main_exe_file(), "space.exe");

    let roots = lib.roots();
    assert!(add_main_to_registry(space, &mut registry, &roots));
    assert_eq!(registry.games.len(), 1);

    let game = &registry.games[0];
    assert_eq!(game.display_name, "Space Game");
    assert_eq!(game.launch.main.target_path(), "{GamesRoot}\\Space Game\\bin\\space.exe");
    assert_eq!(game.launch.main.working_directory(), "{GamesRoot}\\Space Game\\bin");
    assert_eq!(game.launch_key.len(), 64);
    let key = game.game_key;
    let launch_key = game.launch_key.clone();

    // committing again updates the same entry
    assert!(add_main_to_registry(space, &mut registry, &roots));
    assert_eq!(registry.games.len(), 1);
    assert_eq!(registry.games[0].launch_key, launch_key);

    let resolver = LaunchResolver::new(&lib.ctx.config, &lib.ctx.relay_dir_str());
    let launch = resolver.resolve(&mut registry, key, None).map_err(anyhow::Error::msg)?;
    assert_eq!(launch.target, lib.canonical("Games/Space Game/bin/space.exe"));
    assert_eq!(launch.working_directory, lib.canonical("Games/Space Game/bin"));
    assert!(launch.working_directory_exists);
    assert_eq!(launch.token_summary, "{GamesRoot}");
    assert!(launch.command_line().starts_with('"'));
    assert_eq!(registry.games[0].stats.last_result, LastResult::Ok);

    Ok(())
}

#[test]
fn test_committed_tool_launch() -> Result<()> {
    let lib = TestLibrary::new()?;
    lib.file("Games/Forge/forge.exe", 30 * MB);
    let editor = lib.canonical("Games/Forge/tools/editor.exe");
    lib.file("Games/Forge/tools/editor.exe", 2 * MB);

    let mut registry = Registry::default();
    let outcome = lib.scan(ScanOptions::default(), &mut registry, &mut ScanCache::default());
    let mut forge = folder(&outcome, "Forge").clone();
    let roots = lib.roots();

    assert!(!add_tools_to_registry(&forge, &mut registry, &roots));
    assert!(add_main_to_registry(&forge, &mut registry, &roots));
    assert!(toggle_tool(&mut forge, &editor, true));
    assert!(add_tools_to_registry(&forge, &mut registry, &roots));

    let key = registry.games[0].game_key;
    let stored = registry.games[0].launch.tool(&editor).cloned();
    assert_eq!(
        stored.as_ref().map(LaunchContract::target_path),
        Some("{GamesRoot}\\Forge\\tools\\editor.exe")
    );

    let resolver = LaunchResolver::new(&lib.ctx.config, &lib.ctx.relay_dir_str());
    let launch = resolver
        .resolve(&mut registry, key, Some(&editor))
        .map_err(anyhow::Error::msg)?;
    assert!(launch.is_tool);
    assert_eq!(launch.target, editor);
    assert_eq!(launch.working_directory, lib.canonical("Games/Forge/tools"));

    Ok(())
}

#[test]
fn test_moved_library_keeps_launch_key() -> Result<()> {
    let lib = TestLibrary::new()?;
    lib.file("Games/Mover/mover.exe", 5 * MB);

    let mut registry = Registry::default();
    let outcome = lib.scan(ScanOptions::default(), &mut registry, &mut ScanCache::default());
    let roots = lib.roots();
    assert!(add_main_to_registry(folder(&outcome, "Mover"), &mut registry, &roots));
    let key = registry.games[0].game_key;
    let launch_key = registry.games[0].launch_key.clone();

    std::fs::rename(lib.host("Games"), lib.host("Library"))?;
    let mut config = lib.ctx.config.clone();
    config.paths.games_root = "Library".to_string();
    registry.games[0].install = InstallInfo::for_folder(&lib.canonical("Library/Mover"));

    let resolver = LaunchResolver::new(&config, &lib.ctx.relay_dir_str());
    let launch = resolver.resolve(&mut registry, key, None).map_err(anyhow::Error::msg)?;
    assert_eq!(launch.target, lib.canonical("Library/Mover/mover.exe"));
    assert_eq!(registry.games[0].launch_key, launch_key);

    let moved_roots = PathRoots::from_config(&config, &lib.ctx.relay_dir_str());
    assert_eq!(build_launch_key_for_game(&registry.games[0], &moved_roots), launch_key);

    Ok(())
}

#[test]
fn test_missing_target_is_recorded() -> Result<()> {
    let lib = TestLibrary::new()?;
    let exe = lib.file("Games/Gone/gone.exe", 5 * MB);

    let mut registry = Registry::default();
    let outcome = lib.scan(ScanOptions::default(), &mut registry, &mut ScanCache::default());
    assert!(add_main_to_registry(folder(&outcome, "Gone"), &mut registry, &lib.roots()));
    let key = registry.games[0].game_key;

    std::fs::remove_file(exe)?;
    let resolver = LaunchResolver::new(&lib.ctx.config, &lib.ctx.relay_dir_str());
    let err = resolver.resolve(&mut registry, key, None).unwrap_err();

    assert!(matches!(err, LaunchError::TargetMissing { .. }));
    assert_eq!(err.exit_code(), ExitCode::ExeMissing);
    assert_eq!(registry.games[0].stats.last_result, LastResult::MissingExe);
    assert!(registry.games[0].stats.last_validated_utc.is_some());

    Ok(())
}

#[test]
fn test_self_referencing_main_exe_dir_in_registry() -> Result<()> {
    let lib = TestLibrary::new()?;
    lib.file("Games/Loop/bin/loop.exe", 5 * MB);

    let mut registry = Registry::default();
    let mut game = relay::storage::GameEntry::new("Loop");
    game.install = InstallInfo::for_folder(&lib.canonical("Games/Loop"));
    game.install.exe_path = "{Main{MainExeDir}ExeDir}\\loop.exe".to_string();
    game.launch.main = LaunchContract::new(
        "{GameFolder}\\bin\\loop.exe",
        "",
        "{Main{MainExeDir}ExeDir}",
    );
    let key = game.game_key;
    registry.games.push(game);

    // the broken working directory falls back to the target folder
    let resolver = LaunchResolver::new(&lib.ctx.config, &lib.ctx.relay_dir_str());
    let launch = resolver.resolve(&mut registry, key, None).map_err(anyhow::Error::msg)?;
    assert_eq!(launch.target, lib.canonical("Games/Loop/bin/loop.exe"));
    assert_eq!(launch.working_directory, lib.canonical("Games/Loop/bin"));

    registry.games[0].launch.main = LaunchContract::new("{MainExeDir}\\loop.exe", "", "{MainExeDir}");
    let err = resolver.resolve(&mut registry, key, None).unwrap_err();
    assert!(matches!(err.exit_code(), ExitCode::ExeMissing | ExitCode::ConfigInvalid));

    // no stored contract: the nested install exe is the target
    registry.games[0].launch.main = LaunchContract::default();
    let err = resolver.resolve(&mut registry, key, None).unwrap_err();
    assert!(matches!(err.exit_code(), ExitCode::ExeMissing | ExitCode::ConfigInvalid));

    Ok(())
}
