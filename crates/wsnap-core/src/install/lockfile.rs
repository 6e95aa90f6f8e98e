//! Lockfile and import-map I/O. Both share the same `{"imports": {...}}`
//! shape; only the write location and cross-invocation semantics differ.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// `{"imports": {"<specifier>": "<url>", ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    pub imports: BTreeMap<String, String>,
}

impl ImportMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an import map (or lockfile) from disk. A missing file yields an
    /// empty map; the lockfile is explicitly allowed to be absent.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read(path: &Path) -> io::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write atomically: write to a temp file in the same directory, then
    /// rename over the destination.
    ///
    /// # Errors
    /// Returns an error on any filesystem failure.
    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let body = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        wsnap_util::fs::atomic_write(path, body.as_bytes())
    }
}

/// The fixed filename the import map is written under, inside the output
/// directory.
pub const IMPORT_MAP_FILENAME: &str = "import-map.json";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("import-map.json");

        let mut map = ImportMap::new();
        map.imports.insert("react".to_string(), "./react.js".to_string());
        map.write_atomic(&path).unwrap();

        let read_back = ImportMap::read(&path).unwrap();
        assert_eq!(read_back, map);
    }

    #[test]
    fn missing_lockfile_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let map = ImportMap::read(&path).unwrap();
        assert!(map.imports.is_empty());
    }

    #[test]
    fn write_atomic_does_not_leave_tmp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("import-map.json");
        ImportMap::new().write_atomic(&path).unwrap();

        let tmp_exists = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .any(|e| e.file_name().to_string_lossy().ends_with(".tmp"));
        assert!(!tmp_exists);
    }
}
