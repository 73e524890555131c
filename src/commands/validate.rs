use crate::RelayContext;
use crate::config::parser::validate_config;
use crate::scanner::FolderScanner;
use anyhow::Result;

/// `relay validate`: checks the loaded configuration and lists the scan
/// roots that will actually be walked.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn execute(ctx: &RelayContext) -> Result<()> {
    validate_config(&ctx.config)?;

    let scanner = FolderScanner::from_config(&ctx.config, &ctx.relay_dir_str());
    let roots = scanner.resolve_scan_roots(&ctx.config.paths.scan_roots);
    let configured = ctx
        .config
        .paths
        .scan_roots
        .iter()
        .filter(|root| !root.trim().is_empty())
        .count();

    super::print_success(&format!("Configuration is valid: {}", ctx.config_path.display()));
    for root in &roots {
        println!("  scan root: {root}");
    }
    if roots.len() < configured {
        super::print_warning(&format!(
            "{} configured scan roots are missing or duplicated",
            configured - roots.len()
        ));
    }
    Ok(())
}
