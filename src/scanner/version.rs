//! Version resource strings of Windows executables.
//!
//! Only the `StringFileInfo` table is read: the bytes after the first UTF-16LE
//! `StringFileInfo` marker are searched for each key, and the value that
//! follows the key's terminator (padded to a 4-byte boundary) is decoded up to
//! its own terminator. Any failure yields empty strings.

use anyhow::Result;
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use tracing::debug;

const MMAP_THRESHOLD: u64 = 1_048_576;

/// Version strings of one executable; empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionInfo {
    /// `ProductName`.
    pub product_name: String,
    /// `FileDescription`.
    pub file_description: String,
    /// `FileVersion`.
    pub file_version: String,
}

impl VersionInfo {
    /// True when no string was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_name.is_empty() && self.file_description.is_empty() && self.file_version.is_empty()
    }
}

/// Source of version strings for the scanner and launcher.
pub trait VersionProbe: Send + Sync {
    /// Reads the version strings of the file at `path`. Never fails.
    fn probe(&self, path: &Path) -> VersionInfo;
}

/// Reads version strings from PE files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeVersionProbe;

impl VersionProbe for PeVersionProbe {
    fn probe(&self, path: &Path) -> VersionInfo {
        match read_version_info(path) {
            Ok(info) => info,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "version info unavailable");
                VersionInfo::default()
            }
        }
    }
}

/// Probe that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVersionInfo;

impl VersionProbe for NoVersionInfo {
    fn probe(&self, _path: &Path) -> VersionInfo {
        VersionInfo::default()
    }
}

fn read_version_info(path: &Path) -> Result<VersionInfo> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    if len < 2 {
        return Ok(VersionInfo::default());
    }

    if len < MMAP_THRESHOLD {
        let content = std::fs::read(path)?;
        Ok(parse_version_strings(&content))
    } else {
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(parse_version_strings(&mmap))
    }
}

/// Extracts the version strings from the raw bytes of a PE image.
///
/// Values are 4-byte aligned relative to the `VS_VERSIONINFO` block, which
/// need not be aligned within the file.
#[must_use]
pub fn parse_version_strings(data: &[u8]) -> VersionInfo {
    if !data.starts_with(b"MZ") {
        return VersionInfo::default();
    }

    let marker = utf16_bytes("StringFileInfo");
    let Some(start) = find(data, &marker, 0) else {
        return VersionInfo::default();
    };
    let table = start + marker.len();

    // Each block starts with three u16 fields before its key.
    let base = find(data, &utf16_bytes("VS_VERSION_INFO"), 0)
        .filter(|root| *root < start)
        .unwrap_or(start)
        .saturating_sub(BLOCK_HEADER_LEN);

    VersionInfo {
        product_name: read_value(data, base, table, "ProductName"),
        file_description: read_value(data, base, table, "FileDescription"),
        file_version: read_value(data, base, table, "FileVersion"),
    }
}

const BLOCK_HEADER_LEN: usize = 6;

fn read_value(data: &[u8], base: usize, from: usize, key: &str) -> String {
    let mut needle = utf16_bytes(key);
    needle.extend_from_slice(&[0, 0]);

    let Some(found) = find(data, &needle, from) else {
        return String::new();
    };
    let relative = found + needle.len() - base;
    let mut offset = base + ((relative + 3) & !3);

    let mut units = Vec::new();
    while let Some(pair) = data.get(offset..offset + 2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
        offset += 2;
    }

    String::from_utf16_lossy(&units).trim().to_string()
}

fn utf16_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let first = *needle.first()?;
    let tail = haystack.get(from..)?;
    tail.iter()
        .enumerate()
        .filter(|(_, byte)| **byte == first)
        .map(|(index, _)| index)
        .find(|index| tail[*index..].starts_with(needle))
        .map(|index| from + index)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn push_aligned(buffer: &mut Vec<u8>, text: &str) {
        buffer.extend(utf16_bytes(text));
        buffer.extend_from_slice(&[0, 0]);
        while buffer.len() % 4 != 0 {
            buffer.push(0);
        }
    }

    fn push_block(buffer: &mut Vec<u8>, key: &str) {
        buffer.extend_from_slice(&[0, 0, 0, 0, 1, 0]);
        push_aligned(buffer, key);
    }

    /// Minimal image carrying a `StringFileInfo` table.
    pub(crate) fn fake_pe(product: &str, description: &str, version: &str) -> Vec<u8> {
        fake_pe_at(64, product, description, version)
    }

    /// Same image with the version block starting at `offset`.
    fn fake_pe_at(offset: usize, product: &str, description: &str, version: &str) -> Vec<u8> {
        let mut block = Vec::new();
        push_block(&mut block, "VS_VERSION_INFO");
        push_block(&mut block, "StringFileInfo");
        for (key, value) in [
            ("FileDescription", description),
            ("FileVersion", version),
            ("ProductName", product),
        ] {
            push_block(&mut block, key);
            push_aligned(&mut block, value);
        }

        let mut data = b"MZ".to_vec();
        data.resize(offset, 0);
        data.extend(block);
        data
    }

    #[test]
    fn test_parse_version_strings() {
        let data = fake_pe("Space Game", "Space Game Client", "1.2.3.4");
        let info = parse_version_strings(&data);
        assert_eq!(info.product_name, "Space Game");
        assert_eq!(info.file_description, "Space Game Client");
        assert_eq!(info.file_version, "1.2.3.4");
    }

    #[test]
    fn test_unaligned_version_block() {
        for offset in [62, 65, 66, 67] {
            let info = parse_version_strings(&fake_pe_at(offset, "Odd", "Odd Client", "3.1"));
            assert_eq!(info.product_name, "Odd", "block at {offset}");
            assert_eq!(info.file_description, "Odd Client", "block at {offset}");
            assert_eq!(info.file_version, "3.1", "block at {offset}");
        }
    }

    #[test]
    fn test_not_a_pe_file() {
        let mut data = fake_pe("A", "B", "C");
        data[0] = b'X';
        assert!(parse_version_strings(&data).is_empty());
    }

    #[test]
    fn test_missing_table() {
        let mut data = b"MZ".to_vec();
        data.extend(utf16_bytes("ProductName"));
        assert!(parse_version_strings(&data).is_empty());
    }

    #[test]
    fn test_probe_degrades_on_io_error() {
        let info = PeVersionProbe.probe(Path::new("/definitely/not/here.exe"));
        assert!(info.is_empty());
    }

    #[test]
    fn test_probe_reads_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("game.exe");
        std::fs::write(&path, fake_pe("Probe", "", "2.0"))?;

        let info = PeVersionProbe.probe(&path);
        assert_eq!(info.product_name, "Probe");
        assert_eq!(info.file_description, "");
        assert_eq!(info.file_version, "2.0");
        Ok(())
    }
}
