//! File-backed resource store

use std::fs;
use std::path::{Path, PathBuf};

use resmap_types::{Resource, Result};
use tracing::warn;

use crate::{encode_collection, parse_collection, ResourceStore, COLLECTION_KEY};

/// Resource collection stored as `map-resources.json` in a directory
pub struct FileResourceStore {
    store_path: PathBuf,
}

impl FileResourceStore {
    /// Create the store directory if needed and bind to the collection file
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join(format!("{COLLECTION_KEY}.json"));
        Ok(Self { store_path })
    }

    pub fn path(&self) -> &Path {
        &self.store_path
    }
}

impl ResourceStore for FileResourceStore {
    fn load(&self) -> Vec<Resource> {
        if !self.store_path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&self.store_path) {
            Ok(raw) => parse_collection(&raw),
            Err(e) => {
                warn!(path = %self.store_path.display(), "failed to read resource store: {e}");
                Vec::new()
            }
        }
    }

    fn save(&self, resources: &[Resource]) -> Result<()> {
        let content = encode_collection(resources)?;
        fs::write(&self.store_path, content)?;
        Ok(())
    }
}
