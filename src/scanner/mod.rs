//! Discovery of installed games below the configured scan roots.
//!
//! Every top-level folder of a scan root is one game candidate. A folder is
//! restored from the [`ScanCache`] when its fingerprint is unchanged, skipped
//! when it is already registered and the caller asked for that, and rebuilt
//! from disk otherwise. After each folder the registry is enriched with what
//! the scan learned and the reporter is notified.

/// Full rebuild of one folder: classification and main selection.
pub mod classify;
/// Interactive curation and registry commits.
pub mod curation;
/// Folder fingerprints.
pub mod fingerprint;
/// Registry matching.
pub mod known;
/// Progress events and cancellation.
pub mod progress;
/// Compiled exclusion and ignore rules.
pub mod rules;
/// Main-candidate scoring.
pub mod score;
/// Version resource probing.
pub mod version;

pub use classify::{FolderBuilder, suggested_name};
pub use curation::{
    add_all_main_to_registry, add_main_to_registry, add_tools_to_registry, hide_executable, set_main,
    toggle_tool,
};
pub use fingerprint::compute_fingerprint;
pub use progress::{CancelToken, ChannelReporter, ScanEvent, ScanReporter, SilentReporter};
pub use rules::ScanRules;
pub use version::{NoVersionInfo, PeVersionProbe, VersionInfo, VersionProbe};

use crate::config::{Config, ScanningConfig};
use crate::paths::canonical::{eq_ignore_case, from_fs_path, to_fs_path};
use crate::paths::{PathRoots, TokenResolver, resolve_against};
use crate::storage::{FolderCacheEntry, FolderSource, FolderState, GameFolderCandidate, Registry, ScanCache, ScanMetrics};
use chrono::Utc;
use std::sync::Arc;
use tracing::{Level, debug, info, span};
use walkdir::WalkDir;

/// How a scan treats cached and registered folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Reuse cache entries whose fingerprint is unchanged.
    pub incremental: bool,
    /// Do not rebuild folders that map to a registered game.
    pub skip_known: bool,
    /// Rebuild everything, ignoring both options above.
    pub force_full_rescan: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            incremental: true,
            skip_known: false,
            force_full_rescan: false,
        }
    }
}

impl ScanOptions {
    /// Options from the `[scanning]` section.
    #[must_use]
    pub const fn from_config(scanning: &ScanningConfig) -> Self {
        Self {
            incremental: scanning.incremental,
            skip_known: scanning.skip_known,
            force_full_rescan: false,
        }
    }
}

/// Result of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Folders in visiting order.
    pub folders: Vec<GameFolderCandidate>,
    /// Final totals.
    pub metrics: ScanMetrics,
    /// The scan stopped early; `folders` holds what was done.
    pub cancelled: bool,
}

/// Scans game folders with a fixed rule set.
pub struct FolderScanner {
    rules: ScanRules,
    roots: PathRoots,
    probe: Arc<dyn VersionProbe>,
}

impl FolderScanner {
    /// A scanner reading version info from PE files.
    #[must_use]
    pub fn new(rules: ScanRules, roots: PathRoots) -> Self {
        Self {
            rules,
            roots,
            probe: Arc::new(PeVersionProbe),
        }
    }

    /// A scanner for `config`, with relative roots taken from `relay_dir`.
    #[must_use]
    pub fn from_config(config: &Config, relay_dir: &str) -> Self {
        Self::new(
            ScanRules::from_config(&config.scanning, &config.scanner_rules),
            PathRoots::from_config(config, relay_dir),
        )
    }

    /// Replaces the version probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn VersionProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Roots used for tokenizing and resolving paths.
    #[must_use]
    pub const fn roots(&self) -> &PathRoots {
        &self.roots
    }

    /// Resolves scan roots against the relay directory, dropping blanks,
    /// case-insensitive duplicates and roots that are not directories.
    #[must_use]
    pub fn resolve_scan_roots(&self, scan_roots: &[String]) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();
        for root in scan_roots.iter().filter(|r| !r.trim().is_empty()) {
            let root = resolve_against(root, &self.roots.relay_dir);
            if resolved.iter().any(|known| eq_ignore_case(known, &root)) {
                continue;
            }
            if !to_fs_path(&root).is_dir() {
                debug!(root = %root, "scan root missing, skipped");
                continue;
            }
            resolved.push(root);
        }
        resolved
    }

    /// Scans every top-level folder of `scan_roots`.
    ///
    /// `registry` is enriched in place and `cache` receives every rebuilt
    /// folder; both stay consistent when the scan is cancelled.
    pub fn scan(
        &self,
        scan_roots: &[String],
        options: ScanOptions,
        registry: &mut Registry,
        cache: &mut ScanCache,
        reporter: &mut dyn ScanReporter,
        cancel: &CancelToken,
    ) -> ScanOutcome {
        let span = span!(Level::INFO, "scan");
        let _enter = span.enter();

        let roots = self.resolve_scan_roots(scan_roots);
        cache.scan_roots_snapshot.clone_from(&roots);

        let resolver = TokenResolver::new(&self.roots);
        let builder = FolderBuilder::new(&self.rules, self.probe.as_ref(), registry);
        let mut outcome = ScanOutcome::default();

        'roots: for root in &roots {
            let folders = top_level_folders(root);
            info!(root = %root, folders = folders.len(), "scanning root");
            reporter.root_started(root, folders.len());

            for folder_path in folders {
                if cancel.is_cancelled() {
                    info!(done = outcome.folders.len(), "scan cancelled");
                    outcome.cancelled = true;
                    break 'roots;
                }

                let folder = self.scan_folder(&folder_path, options, registry, cache, &builder, &mut outcome.metrics);
                let enriched = known::apply_registry_cross_reference(&folder, registry, &resolver);
                debug!(
                    folder = %folder.folder_path,
                    source = %folder.source,
                    state = %folder.state,
                    exes = folder.exes.len(),
                    enriched,
                    "folder done"
                );

                outcome.metrics.record(&folder);
                reporter.folder_scanned(&folder);
                reporter.metrics_updated(&outcome.metrics);
                outcome.folders.push(folder);
            }

            info!(root = %root, "root done");
        }

        info!(
            folders = outcome.metrics.total_folders,
            mains = outcome.metrics.main_selected,
            cached = outcome.metrics.cached_folders,
            skipped = outcome.metrics.skipped_known_folders,
            "scan finished"
        );
        outcome
    }

    fn scan_folder(
        &self,
        folder_path: &str,
        options: ScanOptions,
        registry: &Registry,
        cache: &mut ScanCache,
        builder: &FolderBuilder<'_>,
        metrics: &mut ScanMetrics,
    ) -> GameFolderCandidate {
        let resolver = TokenResolver::new(&self.roots);
        let known = known::is_known_folder(folder_path, registry, &resolver);
        let fingerprint = compute_fingerprint(&to_fs_path(folder_path));
        let cached = cache.get(folder_path);

        if !options.force_full_rescan
            && options.incremental
            && let Some(entry) = cached.filter(|c| eq_ignore_case(&c.folder_fingerprint, &fingerprint))
        {
            let mut folder = entry.restore();
            folder.source = FolderSource::Cache;
            folder.state = if known { FolderState::Known } else { FolderState::Cached };
            metrics.cached_folders += 1;
            return folder;
        }

        if !options.force_full_rescan && options.skip_known && known {
            let mut folder = cached.map_or_else(
                || {
                    let mut placeholder = GameFolderCandidate::new(folder_path);
                    placeholder.source = FolderSource::Skipped;
                    placeholder
                },
                |entry| {
                    let mut restored = entry.restore();
                    restored.source = FolderSource::Cache;
                    restored
                },
            );
            folder.state = FolderState::Known;
            metrics.skipped_known_folders += 1;
            return folder;
        }

        let mut folder = builder.build(folder_path);
        folder.source = FolderSource::Disk;
        folder.state = if folder.valid_exe_count > 0 {
            FolderState::New
        } else {
            FolderState::NoValidExe
        };
        cache.insert(FolderCacheEntry::from_candidate(&folder, &fingerprint, Utc::now()));
        folder
    }
}

/// Immediate subdirectories of `root` in case-insensitive name order. An
/// unreadable root yields nothing.
fn top_level_folders(root: &str) -> Vec<String> {
    let mut folders: Vec<String> = WalkDir::new(to_fs_path(root))
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(root = %root, error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| from_fs_path(entry.path()))
        .collect();

    folders.sort_by_cached_key(|path| path.to_lowercase());
    folders
}
