//! Registry and scan data model plus its JSON persistence.
//!
//! The scanner and the launcher work on these values in memory; the caller
//! decides when to write them back with [`persist`].

/// Scan cache and per-folder snapshots.
pub mod cache;
/// Launch contracts and per-game launch settings.
pub mod contract;
/// Registered games and the registry document.
pub mod game;
/// JSON load/save helpers.
pub mod persist;
/// Scan results: executable and folder candidates, metrics.
pub mod scan;

pub use cache::{FolderCacheEntry, ScanCache};
pub use contract::{LaunchContract, LaunchSettings};
pub use game::{GameEntry, InstallInfo, LastResult, Registry, StatsInfo};
pub use scan::{ExeCandidate, ExeKind, FolderSource, FolderState, GameFolderCandidate, ScanMetrics};

/// File name of the registry document.
pub const REGISTRY_FILE: &str = "registry.json";

/// File name of the scan cache document.
pub const SCAN_CACHE_FILE: &str = "scan_cache.json";
