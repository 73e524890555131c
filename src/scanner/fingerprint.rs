//! Cheap change detection for scanned folders.
//!
//! A fingerprint is `"<exe count>:<max exe mtime ticks>"`, where ticks are
//! 100 ns intervals since 0001-01-01 UTC. A folder without executables uses
//! its own mtime; a folder that cannot be walked yields just the ticks of its
//! own mtime (or `"0"`).

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use walkdir::WalkDir;

/// Ticks at the Unix epoch.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Converts a timestamp to 100 ns ticks since 0001-01-01 UTC.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn to_ticks(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => UNIX_EPOCH_TICKS + (after.as_nanos() / 100) as i64,
        Err(before) => UNIX_EPOCH_TICKS - (before.duration().as_nanos() / 100) as i64,
    }
}

/// True for `*.exe`, ignoring case.
#[must_use]
pub fn is_exe(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}

/// Every `*.exe` file below `folder`, recursively, in file-name order.
///
/// # Errors
///
/// Returns the first walk error.
pub fn find_executables(folder: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut found = Vec::new();
    for entry in WalkDir::new(folder)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_exe(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Fingerprint of a top-level game folder.
#[must_use]
pub fn compute_fingerprint(folder: &Path) -> String {
    let exes = match find_executables(folder) {
        Ok(exes) => exes,
        Err(e) => {
            debug!(folder = %folder.display(), error = %e, "fingerprint walk failed");
            return modified_ticks(folder).map_or_else(|| "0".to_string(), |t| t.to_string());
        }
    };

    let max_ticks = if exes.is_empty() {
        modified_ticks(folder)
    } else {
        exes.par_iter().filter_map(|path| modified_ticks(path)).max()
    };

    format!("{}:{}", exes.len(), max_ticks.unwrap_or(0))
}

fn modified_ticks(path: &Path) -> Option<i64> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .ok()
        .map(to_ticks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{FileTime, set_file_mtime};
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_to_ticks() {
        assert_eq!(to_ticks(UNIX_EPOCH), UNIX_EPOCH_TICKS);
        assert_eq!(
            to_ticks(UNIX_EPOCH + Duration::from_secs(1)),
            UNIX_EPOCH_TICKS + 10_000_000
        );
        assert_eq!(
            to_ticks(UNIX_EPOCH - Duration::from_secs(1)),
            UNIX_EPOCH_TICKS - 10_000_000
        );
    }

    #[test]
    fn test_is_exe() {
        assert!(is_exe(Path::new("a/Game.EXE")));
        assert!(is_exe(Path::new("game.exe")));
        assert!(!is_exe(Path::new("game.exe.txt")));
        assert!(!is_exe(Path::new("exe")));
    }

    #[test]
    fn test_fingerprint_counts_and_max_mtime() -> anyhow::Result<()> {
        let dir = tempdir()?;
        std::fs::create_dir_all(dir.path().join("bin"))?;
        let a = dir.path().join("a.exe");
        let b = dir.path().join("bin").join("B.EXE");
        std::fs::write(&a, b"a")?;
        std::fs::write(&b, b"b")?;
        set_file_mtime(&a, FileTime::from_unix_time(1_000, 0))?;
        set_file_mtime(&b, FileTime::from_unix_time(2_000, 0))?;

        let expected = UNIX_EPOCH_TICKS + 2_000 * 10_000_000;
        assert_eq!(compute_fingerprint(dir.path()), format!("2:{expected}"));
        Ok(())
    }

    #[test]
    fn test_empty_folder_uses_own_mtime() -> anyhow::Result<()> {
        let dir = tempdir()?;
        set_file_mtime(dir.path(), FileTime::from_unix_time(5_000, 0))?;
        let expected = UNIX_EPOCH_TICKS + 5_000 * 10_000_000;
        assert_eq!(compute_fingerprint(dir.path()), format!("0:{expected}"));
        Ok(())
    }

    #[test]
    fn test_missing_folder() {
        assert_eq!(compute_fingerprint(Path::new("/no/such/folder/anywhere")), "0");
    }
}
