//! Map persistence.
//!
//! The rest of the crate only sees the [`MapStore`] trait. Two stores are provided:
//! an in-memory one and a JSON file store. A save always replaces the previous map
//! as a whole.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifact::MapArtifact;
use crate::cell::{CellDetails, HexCell};
use crate::config::MAX_DIMENSION;
use crate::coords::{from_index, GridDimensions};
use crate::error::{LoadError, PersistError};

/// Durable storage for the current map.
pub trait MapStore: Send + Sync {
    /// Replace whatever is stored with `artifact`.
    fn save(&self, artifact: &MapArtifact) -> Result<(), PersistError>;

    /// Load the stored map. [`LoadError::NotFound`] if nothing was ever saved.
    fn load(&self) -> Result<MapArtifact, LoadError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Store that keeps the map in process memory.
#[derive(Default)]
pub struct MemoryMapStore {
    map: RwLock<Option<MapArtifact>>,
}

impl MemoryMapStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapStore for MemoryMapStore {
    fn save(&self, artifact: &MapArtifact) -> Result<(), PersistError> {
        *self.map.write() = Some(artifact.clone());
        Ok(())
    }

    fn load(&self) -> Result<MapArtifact, LoadError> {
        self.map.read().clone().ok_or(LoadError::NotFound)
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

const SAVE_VERSION: u32 = 1;

/// On-disk layout of a stored map.
#[derive(Serialize, Deserialize)]
struct StoredMap {
    /// Format version for forward compatibility
    version: u32,
    width: u32,
    height: u32,
    seed: String,
    cells: Vec<StoredCell>,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct StoredCell {
    q: i32,
    r: i32,
    details: u16,
}

/// Store that keeps the map in a single JSON file.
///
/// Saves go to a temporary sibling file which is then renamed over the target, so a
/// reader sees either the old map or the new one, never a mix.
pub struct FileMapStore {
    path: PathBuf,
}

impl FileMapStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the stored map, if any.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "map".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MapStore for FileMapStore {
    fn save(&self, artifact: &MapArtifact) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let dims = artifact.dimensions();
        let stored = StoredMap {
            version: SAVE_VERSION,
            width: dims.width,
            height: dims.height,
            seed: artifact.seed().to_string(),
            cells: artifact
                .cells()
                .iter()
                .map(|c| StoredCell {
                    q: c.q,
                    r: c.r,
                    details: c.details.raw(),
                })
                .collect(),
        };

        let tmp = self.temp_path();
        let written = write_stored(&tmp, &stored)
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(PersistError::from));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!(path = %tmp.display(), "temporary map file not removed: {}", cleanup);
            }
            return Err(e);
        }

        debug!(path = %self.path.display(), cells = stored.cells.len(), "map saved");
        Ok(())
    }

    fn load(&self) -> Result<MapArtifact, LoadError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LoadError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredMap = serde_json::from_reader(BufReader::new(file))?;

        rebuild_artifact(stored).inspect_err(|e| {
            warn!(path = %self.path.display(), "rejecting stored map: {}", e);
        })
    }
}

fn write_stored(path: &Path, stored: &StoredMap) -> Result<(), PersistError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, stored)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Check a stored map and put its cells back into canonical order.
///
/// Cells may be stored in any order; after sorting by row then column every cell
/// must sit exactly at its index, which rules out gaps, duplicates and strays.
fn rebuild_artifact(mut stored: StoredMap) -> Result<MapArtifact, LoadError> {
    if stored.version > SAVE_VERSION {
        return Err(LoadError::Inconsistent(format!(
            "save version {} is newer than supported version {}",
            stored.version, SAVE_VERSION
        )));
    }

    let dims = GridDimensions::new(stored.width, stored.height);
    if dims.width == 0 || dims.height == 0 {
        return Err(LoadError::Inconsistent(format!("empty dimensions {}", dims)));
    }
    if dims.width > MAX_DIMENSION || dims.height > MAX_DIMENSION {
        return Err(LoadError::Inconsistent(format!(
            "dimensions {} exceed the {} cell limit",
            dims, MAX_DIMENSION
        )));
    }
    if stored.cells.len() != dims.cell_count() {
        return Err(LoadError::Inconsistent(format!(
            "{} cells stored for a {} map (expected {})",
            stored.cells.len(),
            dims,
            dims.cell_count()
        )));
    }

    stored.cells.sort_by_key(|c| (c.r, c.q));

    let mut cells = Vec::with_capacity(stored.cells.len());
    for (index, stored_cell) in stored.cells.iter().enumerate() {
        let expected = from_index(index as u32, dims.width);
        if (stored_cell.q, stored_cell.r) != (expected.q, expected.r) {
            return Err(LoadError::Inconsistent(format!(
                "cell ({}, {}) found where ({}, {}) was expected",
                stored_cell.q, stored_cell.r, expected.q, expected.r
            )));
        }
        let details = CellDetails::from_raw(stored_cell.details).ok_or_else(|| {
            LoadError::Inconsistent(format!(
                "cell ({}, {}) has invalid details {:#06x}",
                stored_cell.q, stored_cell.r, stored_cell.details
            ))
        })?;
        cells.push(HexCell::new(expected, details));
    }

    MapArtifact::new(dims, stored.seed, cells).map_err(|e| LoadError::Inconsistent(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Biome;
    use crate::config::GeneratorConfig;
    use crate::generation::generate_map;
    use tempfile::tempdir;

    fn small_map(seed: &str) -> MapArtifact {
        generate_map(seed, &GeneratorConfig::with_dimensions(6, 4)).unwrap()
    }

    fn write_raw(path: &Path, json: &str) {
        fs::write(path, json).unwrap();
    }

    #[test]
    fn test_memory_store_empty_is_not_found() {
        let store = MemoryMapStore::new();
        assert!(matches!(store.load(), Err(LoadError::NotFound)));
    }

    #[test]
    fn test_memory_store_save_and_load() {
        let store = MemoryMapStore::new();
        let map = small_map("memory");
        store.save(&map).unwrap();
        assert_eq!(store.load().unwrap(), map);
    }

    #[test]
    fn test_file_store_empty_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileMapStore::new(dir.path().join("map.json"));
        assert!(matches!(store.load(), Err(LoadError::NotFound)));
    }

    #[test]
    fn test_file_store_save_and_load() {
        let dir = tempdir().unwrap();
        let store = FileMapStore::new(dir.path().join("nested").join("map.json"));
        let map = small_map("file");
        store.save(&map).unwrap();

        assert!(store.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), map);
    }

    #[test]
    fn test_file_store_replaces_whole_map() {
        let dir = tempdir().unwrap();
        let store = FileMapStore::new(dir.path().join("map.json"));
        store.save(&small_map("first")).unwrap();

        let second = generate_map("second", &GeneratorConfig::with_dimensions(3, 2)).unwrap();
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, second);
        assert_eq!(loaded.cells().len(), 6);
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        // A non-empty directory at the target makes the final rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let store = FileMapStore::new(&path);
        assert!(matches!(store.save(&small_map("blocked")), Err(PersistError::Io(_))));
        assert!(!store.temp_path().exists());
        assert!(path.join("occupied").exists());
    }

    #[test]
    fn test_file_store_accepts_unordered_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_raw(
            &path,
            r#"{"version":1,"width":2,"height":2,"seed":"s","cells":[
                {"q":1,"r":1,"details":16384},
                {"q":0,"r":0,"details":8192},
                {"q":0,"r":1,"details":0},
                {"q":1,"r":0,"details":4096}
            ]}"#,
        );
        let map = FileMapStore::new(&path).load().unwrap();
        let biomes: Vec<_> = map.cells().iter().map(|c| c.biome()).collect();
        assert_eq!(biomes, vec![Biome::Water, Biome::Forest, Biome::Grass, Biome::Mountain]);
    }

    #[test]
    fn test_file_store_count_mismatch_is_inconsistent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_raw(
            &path,
            r#"{"version":1,"width":2,"height":2,"seed":"s","cells":[
                {"q":0,"r":0,"details":0},
                {"q":1,"r":0,"details":0},
                {"q":0,"r":1,"details":0}
            ]}"#,
        );
        assert!(matches!(FileMapStore::new(&path).load(), Err(LoadError::Inconsistent(_))));
    }

    #[test]
    fn test_file_store_duplicate_cell_is_inconsistent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_raw(
            &path,
            r#"{"version":1,"width":2,"height":1,"seed":"s","cells":[
                {"q":0,"r":0,"details":0},
                {"q":0,"r":0,"details":0}
            ]}"#,
        );
        assert!(matches!(FileMapStore::new(&path).load(), Err(LoadError::Inconsistent(_))));
    }

    #[test]
    fn test_file_store_invalid_details_is_inconsistent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_raw(
            &path,
            r#"{"version":1,"width":1,"height":1,"seed":"s","cells":[{"q":0,"r":0,"details":36864}]}"#,
        );
        assert!(matches!(FileMapStore::new(&path).load(), Err(LoadError::Inconsistent(_))));
    }

    #[test]
    fn test_file_store_garbage_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        write_raw(&path, "not json");
        assert!(matches!(FileMapStore::new(&path).load(), Err(LoadError::Format(_))));
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = FileMapStore::new(dir.path().join("map.json"));
        store.clear().unwrap();
        store.save(&small_map("clear")).unwrap();
        store.clear().unwrap();
        assert!(matches!(store.load(), Err(LoadError::NotFound)));
    }
}
