use crate::RelayContext;
use crate::paths::canonical::paths_equal;
use crate::scanner::hide_executable;
use crate::storage::FolderCacheEntry;
use anyhow::Result;

/// `relay hide`: hides an executable from every scan. Cached folders that
/// contain it are re-tagged so incremental scans agree.
///
/// # Errors
///
/// Returns an error if the registry or the cache cannot be loaded or saved.
pub fn execute(ctx: &RelayContext, exe_path: &str) -> Result<bool> {
    let mut registry = ctx.load_registry()?;
    let mut cache = ctx.load_cache()?;

    let mut snapshots = Vec::new();
    let mut folders = Vec::new();
    for entry in cache
        .folders
        .values()
        .filter(|entry| entry.exe_candidates.iter().any(|exe| paths_equal(&exe.exe_path, exe_path)))
    {
        snapshots.push((entry.folder_fingerprint.clone(), entry.last_scanned_utc));
        folders.push(entry.restore());
    }

    let added = hide_executable(&mut registry, &mut folders, exe_path);

    for ((fingerprint, scanned_at), folder) in snapshots.iter().zip(&folders) {
        cache.insert(FolderCacheEntry::from_candidate(folder, fingerprint, *scanned_at));
    }

    ctx.save_cache(&cache)?;
    ctx.save_registry(&registry)?;

    if added {
        super::print_success(&format!("Hidden {exe_path}"));
    } else {
        super::print_info(&format!("Already hidden: {exe_path}"));
    }
    Ok(added)
}
