use crate::RelayContext;
use crate::output::ScanProgress;
use crate::paths::PathRoots;
use crate::scanner::{ScanOptions, add_all_main_to_registry};
use anyhow::Result;

/// `relay add-all`: scans, then registers the selected main executable of
/// every folder. Returns `(added, skipped)`.
///
/// # Errors
///
/// Returns an error if the registry or the cache cannot be loaded or saved.
pub fn execute(ctx: &RelayContext, options: ScanOptions) -> Result<(usize, usize)> {
    let mut registry = ctx.load_registry()?;
    let mut cache = ctx.load_cache()?;

    let mut progress = ScanProgress::new();
    let outcome = super::scan::run(ctx, options, &mut registry, &mut cache, &mut progress);
    progress.finish();

    let roots = PathRoots::from_config(&ctx.config, &ctx.relay_dir_str());
    let (added, skipped) = add_all_main_to_registry(&outcome.folders, &mut registry, &roots);

    ctx.save_cache(&cache)?;
    ctx.save_registry(&registry)?;

    if added == 0 {
        super::print_info(&format!("Nothing registered ({skipped} folders without a main)"));
    } else {
        super::print_success(&format!("Registered {added} games ({skipped} skipped)"));
    }
    Ok((added, skipped))
}
