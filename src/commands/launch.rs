use crate::RelayContext;
use crate::launcher::{ExitCode, LaunchError, LaunchResolver};
use crate::output;
use anyhow::Result;
use colored::Colorize;
use uuid::Uuid;

/// `relay launch`: resolves the main executable of `key`, or `tool`, and
/// prints the command line. The registry is saved whenever the game exists,
/// so the computed launch key and the check result are kept.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded or saved. Resolution
/// failures are reported through the returned exit code.
pub fn execute(ctx: &RelayContext, key: Uuid, tool: Option<&str>) -> Result<ExitCode> {
    let mut registry = ctx.load_registry()?;
    let resolver = LaunchResolver::new(&ctx.config, &ctx.relay_dir_str());
    let result = resolver.resolve(&mut registry, key, tool);

    if !matches!(result, Err(LaunchError::GameNotFound(_) | LaunchError::ConfigInvalid(_))) {
        ctx.save_registry(&registry)?;
    }

    match result {
        Ok(launch) => {
            output::verbose(&format!("{} {}", "game:".dimmed(), launch.display_name));
            output::verbose(&format!("{} {}", "workdir:".dimmed(), launch.working_directory));
            output::verbose(&format!("{} {}", "tokens:".dimmed(), launch.token_summary));
            if !launch.product_summary.is_empty() {
                output::verbose(&format!("{} {}", "product:".dimmed(), launch.product_summary));
            }
            if !launch.working_directory_exists {
                super::print_warning(&format!(
                    "Working directory does not exist: {}",
                    launch.working_directory
                ));
            }
            println!("{}", launch.command_line());
            Ok(ExitCode::Success)
        }
        Err(e) => {
            super::print_error(&e.to_string());
            Ok(e.exit_code())
        }
    }
}
