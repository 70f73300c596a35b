//! Whole-graph storage for tk-erp
//!
//! The graph is loaded and saved as a single JSON blob, the way a browser
//! keeps it under one storage key. No partial writes, no daemon.

use crate::{Config, DocumentGraph, Error, Result};
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ERP_DIR: &str = ".erp";
pub const CONFIG_FILE: &str = "config.toml";

/// Single-key storage for the document graph
pub trait Store {
    /// Read the stored blob as text. `Ok(None)` means nothing has been
    /// stored yet.
    ///
    /// # Errors
    /// `Error::StorageUnavailable` when the blob exists but cannot be read.
    fn read(&self) -> Result<Option<String>>;

    /// Read and parse the whole graph
    ///
    /// # Errors
    /// `Error::StorageUnavailable` when the blob cannot be read or parsed.
    fn load(&self) -> Result<Option<DocumentGraph>> {
        self.read()?
            .map(|blob| {
                serde_json::from_str(&blob).map_err(|e| Error::StorageUnavailable(e.to_string()))
            })
            .transpose()
    }

    /// Replace the stored graph
    fn save(&self, graph: &DocumentGraph) -> Result<()>;

    /// Drop the stored graph entirely
    fn remove(&self) -> Result<()>;
}

/// In-process store holding the serialized blob
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: &DocumentGraph) -> Result<Self> {
        let store = Self::new();
        store.save(graph)?;
        Ok(store)
    }

    /// Start from a raw blob, which need not be valid JSON
    pub fn from_raw(blob: impl Into<String>) -> Self {
        Self {
            blob: RefCell::new(Some(blob.into())),
        }
    }
}

impl Store for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.blob.borrow().clone())
    }

    fn save(&self, graph: &DocumentGraph) -> Result<()> {
        let blob = serde_json::to_string(graph)?;
        *self.blob.borrow_mut() = Some(blob);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        self.blob.borrow_mut().take();
        Ok(())
    }
}

/// Store backed by a JSON file inside a `.erp/` workspace directory
pub struct JsonFileStore {
    root: PathBuf,
    data_file: String,
}

impl JsonFileStore {
    /// Find and open the workspace for the current directory, falling back
    /// to the per-user workspace
    pub fn open() -> Result<Self> {
        let root = match Self::find_root() {
            Ok(root) => root,
            Err(Error::NotInitialized) => Self::global_root()
                .filter(|root| root.join(ERP_DIR).exists())
                .ok_or(Error::NotInitialized)?,
            Err(e) => return Err(e),
        };
        Self::open_at(root)
    }

    /// Open the workspace rooted at `root`
    pub fn open_at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(ERP_DIR).exists() {
            return Err(Error::NotInitialized);
        }
        let config = Config::load(&root.join(ERP_DIR).join(CONFIG_FILE))?;
        Ok(Self {
            root,
            data_file: config.data_file,
        })
    }

    /// Create a new workspace under `root` with a commented default config
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let erp_dir = root.join(ERP_DIR);

        if erp_dir.exists() {
            return Err(Error::AlreadyInitialized(erp_dir.display().to_string()));
        }

        fs::create_dir_all(&erp_dir)?;
        fs::write(erp_dir.join(CONFIG_FILE), Config::default_with_comments())?;

        Ok(Self {
            root,
            data_file: Config::default().data_file,
        })
    }

    /// Per-user workspace location, used when no `.erp/` is found upwards
    pub fn global_root() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("tk-erp"))
    }

    /// Find the nearest ancestor directory containing `.erp`
    fn find_root() -> Result<PathBuf> {
        let mut current = std::env::current_dir()?;
        loop {
            if current.join(ERP_DIR).exists() {
                return Ok(current);
            }
            if !current.pop() {
                return Err(Error::NotInitialized);
            }
        }
    }

    /// Path to the .erp directory
    pub fn erp_dir(&self) -> PathBuf {
        self.root.join(ERP_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.erp_dir().join(CONFIG_FILE)
    }

    /// Path to the JSON data file
    pub fn data_path(&self) -> PathBuf {
        self.erp_dir().join(&self.data_file)
    }

    pub fn config(&self) -> Result<Config> {
        Config::load(&self.config_path())
    }
}

impl Store for JsonFileStore {
    fn read(&self) -> Result<Option<String>> {
        let path = self.data_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::StorageUnavailable(format!("{}: {}", path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        debug!(path = %path.display(), "read document graph");
        Ok(Some(content))
    }

    fn save(&self, graph: &DocumentGraph) -> Result<()> {
        let path = self.data_path();
        write_json(&path, graph)
            .map_err(|e| Error::StorageWrite(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "saved document graph");
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let path = self.data_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

fn write_json(path: &Path, graph: &DocumentGraph) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, graph)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Material;

    fn sample_graph() -> DocumentGraph {
        let mut graph = DocumentGraph {
            version: "1.0.0".to_string(),
            ..Default::default()
        };
        graph.materials.insert(
            "NVL-001".to_string(),
            Material {
                id: "NVL-001".to_string(),
                name: "Thân bút bi".to_string(),
                current_stock: 1250,
                ..Default::default()
            },
        );
        graph
    }

    #[test]
    fn test_memory_store_save_load_remove() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample_graph()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.materials["NVL-001"].current_stock, 1250);

        store.remove().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_corrupt_blob() {
        let store = MemoryStore::from_raw("[1, 2");
        assert!(matches!(store.load(), Err(Error::StorageUnavailable(_))));
    }

    #[test]
    fn test_file_store_init_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::init(dir.path()).unwrap();
        assert!(store.config_path().exists());
        assert!(store.load().unwrap().is_none());

        store.save(&sample_graph()).unwrap();
        let reopened = JsonFileStore::open_at(dir.path()).unwrap();
        let loaded = reopened.load().unwrap().unwrap();
        assert_eq!(loaded, sample_graph());

        reopened.remove().unwrap();
        assert!(!reopened.data_path().exists());
    }

    #[test]
    fn test_file_store_init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        JsonFileStore::init(dir.path()).unwrap();
        assert!(matches!(
            JsonFileStore::init(dir.path()),
            Err(Error::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_file_store_open_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            JsonFileStore::open_at(dir.path()),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_file_store_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::init(dir.path()).unwrap();
        fs::write(store.data_path(), "{\"materials\": ").unwrap();
        assert!(matches!(store.load(), Err(Error::StorageUnavailable(_))));
    }
}
