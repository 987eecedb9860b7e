//! Store adapters for the persistence layer

use std::path::PathBuf;

use resmap_store::FileResourceStore;
use resmap_types::Result;

use crate::config::Config;

/// Open the file-backed resource store at the configured directory
pub fn open_resource_store(config: &Config) -> Result<FileResourceStore> {
    let store_dir = config.store_dir()?;
    FileResourceStore::open(store_dir)
}

/// Open the file-backed resource store at a custom directory
pub fn open_resource_store_at(store_dir: PathBuf) -> Result<FileResourceStore> {
    FileResourceStore::open(store_dir)
}
