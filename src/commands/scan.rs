use crate::RelayContext;
use crate::output::{self, ScanProgress};
use crate::scanner::{CancelToken, FolderScanner, ScanOptions, ScanOutcome, ScanReporter};
use crate::storage::{Registry, ScanCache};
use anyhow::Result;

/// Scan options from the configuration, overridden by command-line flags.
#[must_use]
pub fn options(ctx: &RelayContext, full: bool, skip_known: bool, no_incremental: bool) -> ScanOptions {
    let mut options = ScanOptions::from_config(&ctx.config.scanning);
    options.force_full_rescan = full;
    options.skip_known |= skip_known;
    if no_incremental {
        options.incremental = false;
    }
    options
}

/// Scans the configured roots into `registry` and `cache`.
pub fn run(
    ctx: &RelayContext,
    options: ScanOptions,
    registry: &mut Registry,
    cache: &mut ScanCache,
    reporter: &mut dyn ScanReporter,
) -> ScanOutcome {
    let scanner = FolderScanner::from_config(&ctx.config, &ctx.relay_dir_str());
    scanner.scan(
        &ctx.config.paths.scan_roots,
        options,
        registry,
        cache,
        reporter,
        &CancelToken::new(),
    )
}

/// `relay scan`: scans, prints one line per folder and saves the cache and
/// the enriched registry.
///
/// # Errors
///
/// Returns an error if the registry or the cache cannot be loaded or saved.
pub fn execute(ctx: &RelayContext, options: ScanOptions) -> Result<ScanOutcome> {
    if ctx.config.paths.scan_roots.iter().all(|root| root.trim().is_empty()) {
        super::print_warning(&format!(
            "No scan roots configured; add paths.scan_roots to {}",
            ctx.config_path.display()
        ));
        return Ok(ScanOutcome::default());
    }

    let mut registry = ctx.load_registry()?;
    let mut cache = ctx.load_cache()?;

    let mut progress = ScanProgress::new();
    let outcome = run(ctx, options, &mut registry, &mut cache, &mut progress);
    progress.finish();

    for folder in &outcome.folders {
        println!("{}", output::folder_line(folder));
    }
    output::info(&output::metrics_line(&outcome.metrics));

    ctx.save_cache(&cache)?;
    ctx.save_registry(&registry)?;
    Ok(outcome)
}
