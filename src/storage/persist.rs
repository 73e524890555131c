//! JSON files for the registry and the scan cache.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Loads a JSON document, returning the default value when the file does not
/// exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        debug!(path = %path.display(), "file missing, using defaults");
        return Ok(T::default());
    }

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if data.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes a JSON document atomically through a temporary sibling file.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    temp.write_all(json.as_bytes())
        .context("Failed to write temporary file")?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

/// Like [`save_json`], but first copies the previous file to `<file>.bak`.
///
/// # Errors
///
/// Returns an error if the backup copy or the write fails.
pub fn save_json_with_backup<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if path.exists() {
        let backup = backup_path(path);
        std::fs::copy(path, &backup)
            .with_context(|| format!("Failed to back up to {}", backup.display()))?;
    }
    save_json(path, value)
}

/// `<file>.bak` next to `path`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{GameEntry, Registry, ScanCache};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_default() -> Result<()> {
        let dir = tempdir()?;
        let registry: Registry = load_json(&dir.path().join("registry.json"))?;
        assert_eq!(registry, Registry::default());

        let cache: ScanCache = load_json(&dir.path().join("scan_cache.json"))?;
        assert!(cache.folders.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("registry.json");

        let mut registry = Registry::default();
        registry.games.push(GameEntry::new("Foo"));
        save_json(&path, &registry)?;

        let loaded: Registry = load_json(&path)?;
        assert_eq!(loaded, registry);
        Ok(())
    }

    #[test]
    fn test_backup_keeps_previous_version() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("registry.json");

        let first = Registry::default();
        save_json_with_backup(&path, &first)?;
        assert!(!backup_path(&path).exists());

        let mut second = Registry::default();
        second.games.push(GameEntry::new("Bar"));
        save_json_with_backup(&path, &second)?;

        let backup: Registry = load_json(&backup_path(&path))?;
        assert_eq!(backup, first);
        let current: Registry = load_json(&path)?;
        assert_eq!(current, second);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_json::<Registry>(&path).is_err());
    }
}
