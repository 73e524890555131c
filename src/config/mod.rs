//! `relay.toml` settings.

/// TOML reading and semantic validation.
pub mod parser;
/// Unknown and ignored key detection.
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Minimum executable size used when `scanning.min_exe_bytes` is not positive.
pub const DEFAULT_MIN_EXE_BYTES: u64 = 524_288;

/// Prefix marking a scanner rule as a regular expression.
pub const REGEX_RULE_PREFIX: &str = "regex:";

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Must be at least 1
    #[serde(default = "default_schema_version")]
    pub schema_version: i64,

    /// Library roots
    #[serde(default)]
    pub paths: PathsConfig,

    /// LaunchBox integration
    #[serde(default)]
    pub launchbox: LaunchBoxConfig,

    /// Folder scanning behaviour
    #[serde(default)]
    pub scanning: ScanningConfig,

    /// Ignore rules that demote executables to tools
    #[serde(default)]
    pub scanner_rules: ScannerRulesConfig,

    /// Launch behaviour
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Scan cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging switches
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Library roots. Relative values are taken relative to the relay directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Value of `{GamesRoot}`
    #[serde(default)]
    pub games_root: String,
    /// Value of `{CacheRoot}`
    #[serde(default)]
    pub cache_root: String,
    /// Value of `{LaunchBoxRoot}`
    #[serde(default)]
    pub launchbox_root: String,
    /// Folders whose subfolders are scanned as games
    #[serde(default)]
    pub scan_roots: Vec<String>,
}

/// LaunchBox settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LaunchBoxConfig {
    /// Used for `{LaunchBoxRoot}` when `paths.launchbox_root` is empty
    #[serde(default)]
    pub root_path: String,
}

/// Scanner thresholds and exclusions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanningConfig {
    /// Executables smaller than this are tagged `SmallExe`
    #[serde(default = "default_min_exe_bytes")]
    pub min_exe_bytes: i64,
    /// File-name wildcards excluded outright (`unins*.exe`)
    #[serde(default)]
    pub excluded_exe_patterns: Vec<String>,
    /// Folder-name wildcards; any executable below a matching folder is excluded
    #[serde(default)]
    pub excluded_folder_names: Vec<String>,
    /// Reuse cached folders whose fingerprint is unchanged
    #[serde(default = "default_true")]
    pub incremental: bool,
    /// Do not rebuild folders that belong to registered games
    #[serde(default)]
    pub skip_known: bool,
}

/// Ignore rules; plain text, wildcards or `regex:` expressions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScannerRulesConfig {
    /// Matched against executable file names
    #[serde(default)]
    pub exe_ignore_name_patterns: Vec<String>,
    /// Matched against every folder name between the game folder and the executable
    #[serde(default)]
    pub exe_ignore_folder_name_patterns: Vec<String>,
}

/// Launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Kept for the shell; relay itself never spawns processes
    #[serde(default = "default_true")]
    pub actually_launch: bool,
}

/// Scan cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Requires `paths.cache_root` when enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiagnosticsConfig {
    /// Debug-level logging without `--verbose`
    #[serde(default)]
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            paths: PathsConfig::default(),
            launchbox: LaunchBoxConfig::default(),
            scanning: ScanningConfig::default(),
            scanner_rules: ScannerRulesConfig::default(),
            launch: LaunchConfig::default(),
            cache: CacheConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            min_exe_bytes: default_min_exe_bytes(),
            excluded_exe_patterns: Vec::new(),
            excluded_folder_names: Vec::new(),
            incremental: true,
            skip_known: false,
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            actually_launch: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ScanningConfig {
    /// Size floor in bytes; non-positive configured values fall back to the
    /// default.
    #[must_use]
    pub fn effective_min_exe_bytes(&self) -> u64 {
        u64::try_from(self.min_exe_bytes)
            .ok()
            .filter(|bytes| *bytes > 0)
            .unwrap_or(DEFAULT_MIN_EXE_BYTES)
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// A missing file is created with defaults. Empty default folders are
    /// filled in and written back.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or written
    /// - The file contains invalid TOML
    /// - The configuration fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            config.apply_default_folders();
            config.save(path)?;
            return Ok(config);
        }

        let mut config = parser::read_config_file(path)?;
        if config.apply_default_folders() {
            config.save(path)?;
        }
        parser::validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Fills empty `cache_root` and `games_root` with their defaults.
    /// Returns true when something changed.
    pub fn apply_default_folders(&mut self) -> bool {
        let mut changed = false;

        if self.paths.cache_root.trim().is_empty() {
            self.paths.cache_root = "Cache".to_string();
            changed = true;
        }

        if self.paths.games_root.trim().is_empty() {
            self.paths.games_root = self
                .paths
                .scan_roots
                .iter()
                .find(|root| !root.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| "ScanRoots".to_string());
            changed = true;
        }

        changed
    }
}

// Default functions for serde
const fn default_schema_version() -> i64 {
    1
}

const fn default_min_exe_bytes() -> i64 {
    524_288
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_effective_min_exe_bytes() {
        let mut scanning = ScanningConfig::default();
        assert_eq!(scanning.effective_min_exe_bytes(), DEFAULT_MIN_EXE_BYTES);
        scanning.min_exe_bytes = 0;
        assert_eq!(scanning.effective_min_exe_bytes(), DEFAULT_MIN_EXE_BYTES);
        scanning.min_exe_bytes = -5;
        assert_eq!(scanning.effective_min_exe_bytes(), DEFAULT_MIN_EXE_BYTES);
        scanning.min_exe_bytes = 1024;
        assert_eq!(scanning.effective_min_exe_bytes(), 1024);
    }

    #[test]
    fn test_load_creates_default_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("relay.toml");

        let config = Config::load(&path)?;
        assert!(path.exists());
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.paths.cache_root, "Cache");
        assert_eq!(config.paths.games_root, "ScanRoots");
        assert!(config.scanning.incremental);
        Ok(())
    }

    #[test]
    fn test_games_root_defaults_to_first_scan_root() {
        let mut config = Config::default();
        config.paths.scan_roots = vec![String::new(), "D:\\Library".to_string()];
        assert!(config.apply_default_folders());
        assert_eq!(config.paths.games_root, "D:\\Library");
        assert!(!config.apply_default_folders());
    }

    #[test]
    fn test_save_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("relay.toml");

        let mut config = Config::default();
        config.paths.games_root = "D:\\Games".to_string();
        config.paths.cache_root = "D:\\Cache".to_string();
        config.scanning.excluded_folder_names = vec!["*redist*".to_string()];
        config.save(&path)?;

        let loaded = Config::load(&path)?;
        assert_eq!(loaded.paths.games_root, "D:\\Games");
        assert_eq!(loaded.scanning.excluded_folder_names, vec!["*redist*".to_string()]);
        Ok(())
    }
}
