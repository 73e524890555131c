#![warn(missing_docs)]
#![allow(clippy::arithmetic_side_effects)] // Counters and scores cannot overflow in practice
#![allow(clippy::float_arithmetic)] // Heuristic scoring is floating point

//! # Relay - Game Library Scanner and Launch Core
//!
//! Relay discovers installed games below configured scan roots, picks the
//! main executable of every game folder, stores portable launch contracts in
//! a registry and resolves them back into concrete command lines.
//!
//! ## Features
//!
//! - **Canonical Paths**: Windows-style path normalization that works on any host
//! - **Launch Identity**: SHA-256 keys over canonical `target|args|workdir` strings
//! - **Portable Contracts**: `{GamesRoot}`-style tokens instead of absolute paths
//! - **Heuristic Scanner**: size, name and version-resource scoring per folder
//! - **Incremental Scans**: per-folder fingerprints reuse the previous result
//!
//! ## Architecture
//!
//! - [`paths`]: Canonicalization, path tokens, tokenizer and resolver
//! - [`identity`]: Launch keys
//! - [`storage`]: Registry, scan cache and their JSON files
//! - [`scanner`]: Folder scanning, scoring and curation
//! - [`launcher`]: Launch contract resolution and exit codes
//! - [`config`]: TOML configuration
//! - [`commands`]: CLI command implementations
//! - [`output`]: Terminal output and scan progress
//!
//! ## Example Usage
//!
//! ```no_run
//! use relay::RelayContext;
//! use relay::scanner::{CancelToken, FolderScanner, ScanOptions, SilentReporter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = RelayContext::new()?;
//! let mut registry = ctx.load_registry()?;
//! let mut cache = ctx.load_cache()?;
//!
//! let scanner = FolderScanner::from_config(&ctx.config, &ctx.relay_dir_str());
//! let outcome = scanner.scan(
//!     &ctx.config.paths.scan_roots,
//!     ScanOptions::from_config(&ctx.config.scanning),
//!     &mut registry,
//!     &mut cache,
//!     &mut SilentReporter,
//!     &CancelToken::new(),
//! );
//! println!("{} folders", outcome.metrics.total_folders);
//!
//! ctx.save_cache(&cache)?;
//! ctx.save_registry(&registry)?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Launch identity keys.
pub mod identity;

/// Launch contract resolution.
pub mod launcher;

/// Output formatting and progress display.
pub mod output;

/// Path canonicalization, tokens and resolution.
pub mod paths;

/// Game folder scanning, scoring and curation.
pub mod scanner;

/// Registry, scan cache and persistence.
pub mod storage;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use storage::{Registry, ScanCache};

/// Current version of the relay binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file name inside the relay directory.
pub const CONFIG_FILE: &str = "relay.toml";

/// Environment variable overriding the relay directory.
pub const HOME_ENV: &str = "RELAY_HOME";

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV: &str = "RELAY_CONFIG_PATH";

/// Central context for all relay operations.
///
/// Holds the relay directory (base for relative roots and home of the data
/// files) and the loaded configuration.
///
/// # Examples
///
/// ```no_run
/// use relay::RelayContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Relay directory from RELAY_HOME or next to the executable
/// let ctx = RelayContext::new()?;
///
/// // Explicit directory (for testing)
/// let ctx = RelayContext::new_explicit("/tmp/relay".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RelayContext {
    /// Directory holding the configuration and data files.
    pub relay_dir: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl RelayContext {
    /// Creates a context for the default relay directory.
    ///
    /// The directory is `RELAY_HOME` when set, else the directory of the
    /// running executable, else `<data dir>/relay`. The config path may be
    /// overridden with `RELAY_CONFIG_PATH`.
    ///
    /// # Errors
    /// Returns an error if no relay directory can be determined or the
    /// configuration cannot be read, created or validated.
    pub fn new() -> Result<Self> {
        let relay_dir = default_relay_dir()?;
        let config_path = std::env::var(CONFIG_ENV)
            .map_or_else(|_| relay_dir.join(CONFIG_FILE), PathBuf::from);
        Self::with_paths(relay_dir, config_path)
    }

    /// Creates a context rooted at `relay_dir`, ignoring the environment.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be read, created or
    /// validated.
    pub fn new_explicit(relay_dir: PathBuf) -> Result<Self> {
        let config_path = relay_dir.join(CONFIG_FILE);
        Self::with_paths(relay_dir, config_path)
    }

    fn with_paths(relay_dir: PathBuf, config_path: PathBuf) -> Result<Self> {
        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            tracing::warn!(error = %e, "configuration field check failed");
        }

        let config = config::Config::load(&config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

        Ok(Self {
            relay_dir,
            config_path,
            config,
        })
    }

    /// Relay directory in canonical form.
    #[must_use]
    pub fn relay_dir_str(&self) -> String {
        paths::canonical::from_fs_path(&self.relay_dir)
    }

    /// Path of the registry document.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.relay_dir.join(storage::REGISTRY_FILE)
    }

    /// Path of the scan cache document.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.relay_dir.join(storage::SCAN_CACHE_FILE)
    }

    /// Loads the registry; a missing file yields an empty registry.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_registry(&self) -> Result<Registry> {
        storage::persist::load_json(&self.registry_path())
    }

    /// Saves the registry, keeping the previous file as `registry.json.bak`.
    ///
    /// # Errors
    /// Returns an error if the backup or the write fails.
    pub fn save_registry(&self, registry: &Registry) -> Result<()> {
        storage::persist::save_json_with_backup(&self.registry_path(), registry)
    }

    /// Loads the scan cache, or an empty one when caching is disabled or the
    /// file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_cache(&self) -> Result<ScanCache> {
        if !self.config.cache.enabled {
            return Ok(ScanCache::default());
        }
        storage::persist::load_json(&self.cache_path())
    }

    /// Saves the scan cache. Does nothing when caching is disabled.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn save_cache(&self, cache: &ScanCache) -> Result<()> {
        if !self.config.cache.enabled {
            return Ok(());
        }
        storage::persist::save_json(&self.cache_path(), cache)
    }
}

fn default_relay_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV)
        && !home.trim().is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    if let Some(dir) = std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
    {
        return Ok(dir.to_path_buf());
    }

    dirs::data_dir()
        .map(|dir| dir.join("relay"))
        .context("Could not determine the relay directory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_context_creates_config() {
        let dir = tempdir().unwrap();
        let ctx = RelayContext::new_explicit(dir.path().to_path_buf()).unwrap();

        assert!(ctx.config_path.exists());
        assert_eq!(ctx.config.paths.cache_root, "Cache");
        assert_eq!(ctx.registry_path(), dir.path().join("registry.json"));
        assert_eq!(ctx.cache_path(), dir.path().join("scan_cache.json"));
    }

    #[test]
    fn test_registry_round_trip_keeps_backup() {
        let dir = tempdir().unwrap();
        let ctx = RelayContext::new_explicit(dir.path().to_path_buf()).unwrap();

        let mut registry = ctx.load_registry().unwrap();
        assert!(registry.games.is_empty());

        registry.games.push(storage::GameEntry::new("First"));
        ctx.save_registry(&registry).unwrap();
        registry.games.push(storage::GameEntry::new("Second"));
        ctx.save_registry(&registry).unwrap();

        assert_eq!(ctx.load_registry().unwrap().games.len(), 2);
        let backup = storage::persist::backup_path(&ctx.registry_path());
        let previous: Registry = storage::persist::load_json(&backup).unwrap();
        assert_eq!(previous.games.len(), 1);
    }

    #[test]
    fn test_disabled_cache_is_not_written() {
        let dir = tempdir().unwrap();
        let mut ctx = RelayContext::new_explicit(dir.path().to_path_buf()).unwrap();
        ctx.config.cache.enabled = false;

        ctx.save_cache(&ScanCache::default()).unwrap();
        assert!(!ctx.cache_path().exists());
    }
}
