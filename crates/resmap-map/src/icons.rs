//! Marker icon loading

use std::future::Future;
use std::path::{Path, PathBuf};

use resmap_types::MapError;
use tracing::debug;

use crate::widget::MarkerIcon;

/// Asynchronous source of marker images keyed by asset path (`/pins/<type>.png`)
pub trait IconLoader {
    fn load_icon(&self, path: &str) -> impl Future<Output = Result<MarkerIcon, MapError>> + Send;
}

/// Reads icons from an assets directory on disk
#[derive(Debug, Clone)]
pub struct FsIconLoader {
    root: PathBuf,
}

impl FsIconLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl IconLoader for FsIconLoader {
    async fn load_icon(&self, path: &str) -> Result<MarkerIcon, MapError> {
        let file = self.resolve(path);
        debug!(path = %file.display(), "loading marker icon");

        let bytes = tokio::fs::read(&file).await.map_err(|e| MapError::IconLoad {
            url: path.to_string(),
            reason: e.to_string(),
        })?;
        MarkerIcon::decode(&bytes).map_err(|e| MapError::IconLoad {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }
}
