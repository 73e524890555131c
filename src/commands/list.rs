use crate::RelayContext;
use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use std::time::Duration;

/// `relay list`: prints every registered game with its key and last check.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded.
pub fn execute(ctx: &RelayContext) -> Result<()> {
    let registry = ctx.load_registry()?;
    if registry.games.is_empty() {
        super::print_info("No games registered");
        return Ok(());
    }

    let now = Utc::now();
    for game in &registry.games {
        let played = game
            .stats
            .last_played_utc
            .and_then(|at| (now - at).to_std().ok())
            .map(|age| {
                let age = Duration::from_secs(age.as_secs());
                format!(", played {} ago", humantime::format_duration(age))
            })
            .unwrap_or_default();

        println!(
            "{} {} {}",
            game.game_key.to_string().yellow(),
            game.display_name.bold(),
            format!("[{}{played}]", game.stats.last_result).dimmed()
        );
        let target = game.launch.main.target_path();
        if !target.is_empty() {
            println!("    {}", target.dimmed());
        }
    }
    Ok(())
}
