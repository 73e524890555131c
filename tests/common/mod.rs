#![allow(dead_code)]

use anyhow::Result;
use relay::RelayContext;
use relay::config::Config;
use relay::paths::PathRoots;
use relay::paths::canonical::from_fs_path;
use relay::scanner::{CancelToken, FolderScanner, ScanOptions, ScanOutcome, SilentReporter};
use relay::storage::{ExeCandidate, GameFolderCandidate, Registry, ScanCache};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MB: u64 = 1_000_000;

/// Relay directory with a `Games` library below it, used as scan root and
/// `{GamesRoot}`.
pub struct TestLibrary {
    pub temp_dir: TempDir,
    pub ctx: RelayContext,
}

impl TestLibrary {
    /// Creates the relay directory and its configuration file.
    pub fn new() -> Result<Self> {
        Self::with_config(|_| {})
    }

    /// Like [`new`](Self::new), letting the caller adjust the configuration
    /// before it is saved.
    pub fn with_config(edit: impl FnOnce(&mut Config)) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        std::fs::create_dir_all(temp_dir.path().join("Games"))?;

        let mut ctx = RelayContext::new_explicit(temp_dir.path().to_path_buf())?;
        ctx.config.paths.games_root = "Games".to_string();
        ctx.config.paths.scan_roots = vec!["Games".to_string()];
        edit(&mut ctx.config);
        ctx.config.save(&ctx.config_path)?;

        Ok(Self { temp_dir, ctx })
    }

    /// Root of the temporary tree.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Host path of `relative` below the relay directory.
    pub fn host(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    /// Canonical path of `relative` below the relay directory.
    pub fn canonical(&self, relative: &str) -> String {
        from_fs_path(&self.host(relative))
    }

    /// Creates a sparse file of `len` bytes, with parent folders.
    pub fn file(&self, relative: &str, len: u64) -> PathBuf {
        let path = self.host(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(&path).unwrap().set_len(len).unwrap();
        path
    }

    pub fn roots(&self) -> PathRoots {
        PathRoots::from_config(&self.ctx.config, &self.ctx.relay_dir_str())
    }

    pub fn scanner(&self) -> FolderScanner {
        FolderScanner::from_config(&self.ctx.config, &self.ctx.relay_dir_str())
    }

    /// Scans the configured roots silently.
    pub fn scan(&self, options: ScanOptions, registry: &mut Registry, cache: &mut ScanCache) -> ScanOutcome {
        self.scanner().scan(
            &self.ctx.config.paths.scan_roots,
            options,
            registry,
            cache,
            &mut SilentReporter,
            &CancelToken::new(),
        )
    }

    /// A full rescan with a fresh registry and cache.
    pub fn full_scan(&self) -> ScanOutcome {
        let options = ScanOptions {
            incremental: false,
            force_full_rescan: true,
            ..ScanOptions::default()
        };
        self.scan(options, &mut Registry::default(), &mut ScanCache::default())
    }
}

/// The scanned folder named `name`.
pub fn folder<'a>(outcome: &'a ScanOutcome, name: &str) -> &'a GameFolderCandidate {
    outcome
        .folders
        .iter()
        .find(|f| f.folder_name == name)
        .unwrap_or_else(|| panic!("folder {name} not scanned"))
}

/// The executable of `folder` whose file name is `name`.
pub fn exe<'a>(folder: &'a GameFolderCandidate, name: &str) -> &'a ExeCandidate {
    folder
        .exes
        .iter()
        .find(|e| e.exe_name().eq_ignore_ascii_case(name))
        .unwrap_or_else(|| panic!("{name} not found in {}", folder.folder_name))
}
