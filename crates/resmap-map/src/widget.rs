//! Seam between the synchronizer and a concrete map view

use resmap_domain::FeatureCollection;
use resmap_types::{GeoPoint, MapError};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cluster::ClusterOptions;

/// Decoded RGBA marker image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl MarkerIcon {
    /// Decode any format the `image` crate understands
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }
}

/// Camera destination of an animated flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraTarget {
    pub center: GeoPoint,
    pub zoom: f64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Circle,
    Symbol,
}

/// Which features of the source a layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFilter {
    Clusters,
    Unclustered,
}

impl LayerFilter {
    fn expression(&self) -> Value {
        match self {
            LayerFilter::Clusters => json!(["has", "point_count"]),
            LayerFilter::Unclustered => json!(["!", ["has", "point_count"]]),
        }
    }
}

/// Style layer bound to a source
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub filter: LayerFilter,
    pub layout: Value,
    pub paint: Value,
}

impl LayerSpec {
    /// MapLibre style-spec representation
    pub fn to_style_json(&self) -> Value {
        let mut layer = json!({
            "id": self.id,
            "type": self.kind,
            "source": self.source,
            "filter": self.filter.expression(),
        });
        if !self.layout.is_null() {
            layer["layout"] = self.layout.clone();
        }
        if !self.paint.is_null() {
            layer["paint"] = self.paint.clone();
        }
        layer
    }
}

/// Operations the synchronizer needs from a map view.
///
/// Implemented by [`HeadlessMap`](crate::HeadlessMap) and by UI front-ends.
pub trait MapWidget {
    fn has_image(&self, id: &str) -> bool;

    fn add_image(&mut self, id: &str, icon: MarkerIcon);

    fn has_source(&self, id: &str) -> bool;

    fn add_clustered_source(&mut self, id: &str, data: FeatureCollection, options: ClusterOptions);

    /// Replace the data of an existing source wholesale
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<(), MapError>;

    fn has_layer(&self, id: &str) -> bool;

    fn add_layer(&mut self, layer: LayerSpec);

    fn cluster_expansion_zoom(&self, source: &str, cluster_id: u64) -> Result<f64, MapError>;

    fn zoom(&self) -> f64;

    fn fly_to(&mut self, target: CameraTarget);
}
