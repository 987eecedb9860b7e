//! Map session setup shared by the CLI and GUI

use resmap_domain::FeatureCollection;
use resmap_map::{FsIconLoader, HeadlessMap, IconLoadReport, MapSync};
use resmap_types::Result;

use crate::config::Config;

/// Initial zoom of a new map view
pub const DEFAULT_ZOOM: f64 = 11.0;

pub struct MapSession {
    pub widget: HeadlessMap,
    pub sync: MapSync,
    pub icons: IconLoadReport,
}

impl MapSession {
    /// Push a new collection to the session's widget
    pub fn update(&mut self, data: FeatureCollection) -> Result<()> {
        self.sync.push(&mut self.widget, data)?;
        Ok(())
    }
}

/// Create a headless widget centered on the home location, load marker icons
/// from the assets directory and apply `data` once ready.
pub async fn open_map(config: &Config, data: FeatureCollection) -> Result<MapSession> {
    let mut widget = HeadlessMap::new(config.style_url.clone(), config.home, DEFAULT_ZOOM);
    let mut sync = MapSync::default();
    let loader = FsIconLoader::new(config.assets_dir());

    sync.push(&mut widget, data)?;
    let icons = sync.on_style_loaded(&mut widget, &loader).await;

    Ok(MapSession {
        widget,
        sync,
        icons,
    })
}
