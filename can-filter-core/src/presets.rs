//! Preset persistence
//!
//! A preset is a named identifier-list string saved for reuse across
//! sessions. The store is a flat JSON object on disk mapping preset name to
//! identifier text, e.g. `{"EngineBus": "0x100, 0x200, 500"}`.
//!
//! The file is loaded lazily on every query; a missing or corrupt file reads
//! as an empty store, never a fatal error. Saves rewrite the full mapping
//! through a temp file in the same directory and rename it over the target,
//! so a failed write leaves the previous file intact. Concurrent external
//! edits are not guarded against; last writer wins.

use crate::types::{FilterError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default preset file name, resolved in the working directory
pub const DEFAULT_PRESETS_FILE: &str = "can_id_presets.json";

/// Name -> identifier-list persistence at a fixed path
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::new(DEFAULT_PRESETS_FILE)
    }
}

impl PresetStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full mapping from disk
    ///
    /// A missing file is an empty store. A file that is not valid JSON is
    /// also treated as empty (logged, not fatal).
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(FilterError::PresetIo {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        match serde_json::from_str(&contents) {
            Ok(presets) => Ok(presets),
            Err(e) => {
                log::warn!(
                    "preset file {:?} is not valid JSON, treating as empty: {}",
                    self.path,
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Save or overwrite a named preset
    ///
    /// Name and identifier text are trimmed; either being empty is a
    /// validation error and nothing is written.
    pub fn save(&self, name: &str, identifier_text: &str) -> Result<()> {
        let name = name.trim();
        let identifier_text = identifier_text.trim();
        if name.is_empty() {
            return Err(FilterError::EmptyPresetName);
        }
        if identifier_text.is_empty() {
            return Err(FilterError::EmptyPresetText);
        }

        let mut presets = self.load()?;
        presets.insert(name.to_string(), identifier_text.to_string());
        self.write_all(&presets)?;

        log::info!("saved preset '{}' to {:?}", name, self.path);
        Ok(())
    }

    /// Look up the identifier text stored under a preset name
    ///
    /// A name with no entry is an error, not an empty result.
    pub fn get(&self, name: &str) -> Result<String> {
        self.load()?
            .remove(name)
            .ok_or_else(|| FilterError::PresetNotFound(name.to_string()))
    }

    /// Saved preset names in stable (sorted) order
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }

    fn write_all(&self, presets: &BTreeMap<String, String>) -> Result<()> {
        let io_err = |source| FilterError::PresetIo {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Write the whole mapping to a sibling temp file, then rename it
        // over the target so a failed write cannot corrupt the old file.
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, presets)
            .map_err(|e| io_err(io::Error::from(e)))?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> PresetStore {
        PresetStore::new(dir.path().join("presets.json"))
    }

    #[test]
    fn test_missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_json_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("P1", "100,200").unwrap();
        assert_eq!(store.get("P1").unwrap(), "100,200");
    }

    #[test]
    fn test_save_overwrites_existing_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("P1", "100").unwrap();
        store.save("P1", "0x7E0, 0x7E8").unwrap();
        assert_eq!(store.get("P1").unwrap(), "0x7E0, 0x7E8");
        assert_eq!(store.list().unwrap(), ["P1"]);
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("P1", "100").unwrap();

        assert!(matches!(
            store.get("P2"),
            Err(FilterError::PresetNotFound(name)) if name == "P2"
        ));
    }

    #[test]
    fn test_empty_name_or_text_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(matches!(
            store.save("  ", "100"),
            Err(FilterError::EmptyPresetName)
        ));
        assert!(matches!(
            store.save("P1", "  "),
            Err(FilterError::EmptyPresetText)
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_persistence_survives_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");

        let first = PresetStore::new(&path);
        first.save("EngineBus", "0x100, 0x200, 500").unwrap();
        first.save("Diag", "0x7E0").unwrap();
        drop(first);

        // A fresh store on the same path sees everything saved earlier
        let second = PresetStore::new(&path);
        assert_eq!(second.get("EngineBus").unwrap(), "0x100, 0x200, 500");
        assert_eq!(second.get("Diag").unwrap(), "0x7E0");
        assert_eq!(second.list().unwrap(), ["Diag", "EngineBus"]);
    }

    #[test]
    fn test_backing_file_is_a_flat_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("EngineBus", "0x100, 0x200, 500").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["EngineBus"], "0x100, 0x200, 500");
    }
}
