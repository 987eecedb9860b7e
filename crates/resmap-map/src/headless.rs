//! In-memory map widget
//!
//! Holds registered images, clustered sources and layers, computes what would
//! be rendered at the current camera, and hit-tests screen positions. Used by
//! the CLI for style export and by the desktop front-end for drawing.

use std::collections::HashMap;

use resmap_domain::{Feature, FeatureCollection};
use resmap_types::{GeoPoint, MapError};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cluster::{self, ClusterIndex, ClusterNode, ClusterOptions};
use crate::sync::{cluster_style, ClickedFeature};
use crate::widget::{CameraTarget, LayerSpec, MapWidget, MarkerIcon};

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Hit radius around an unclustered marker, in pixels
const POINT_HIT_RADIUS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub center: GeoPoint,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedFeature {
    Cluster {
        cluster_id: u64,
        point_count: usize,
        position: GeoPoint,
    },
    Point(Feature),
}

impl RenderedFeature {
    pub fn position(&self) -> GeoPoint {
        match self {
            RenderedFeature::Cluster { position, .. } => *position,
            RenderedFeature::Point(f) => GeoPoint::new(f.latitude(), f.longitude()),
        }
    }

    /// What a click on this feature reports
    pub fn to_clicked(&self) -> ClickedFeature {
        match self {
            RenderedFeature::Cluster {
                cluster_id, position, ..
            } => ClickedFeature::Cluster {
                cluster_id: *cluster_id,
                position: *position,
            },
            RenderedFeature::Point(f) => ClickedFeature::Point(f.properties.clone()),
        }
    }

    fn hit_radius(&self) -> f64 {
        match self {
            RenderedFeature::Cluster { point_count, .. } => cluster_style(*point_count).1,
            RenderedFeature::Point(_) => POINT_HIT_RADIUS,
        }
    }
}

#[derive(Debug, Clone)]
struct ClusteredSource {
    data: FeatureCollection,
    index: ClusterIndex,
}

impl ClusteredSource {
    fn new(data: FeatureCollection, options: ClusterOptions) -> Self {
        let index = ClusterIndex::new(&data, options);
        Self { data, index }
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessMap {
    style_url: String,
    images: HashMap<String, MarkerIcon>,
    sources: HashMap<String, ClusteredSource>,
    layers: Vec<LayerSpec>,
    camera: Camera,
    flights: Vec<CameraTarget>,
}

impl HeadlessMap {
    pub fn new(style_url: impl Into<String>, center: GeoPoint, zoom: f64) -> Self {
        Self {
            style_url: style_url.into(),
            images: HashMap::new(),
            sources: HashMap::new(),
            layers: Vec::new(),
            camera: Camera {
                center,
                zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            },
            flights: Vec::new(),
        }
    }

    pub fn style_url(&self) -> &str {
        &self.style_url
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, center: GeoPoint, zoom: f64) {
        self.camera = Camera {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.camera.zoom = (self.camera.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Shift the camera by a screen-space drag
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (x, y) = cluster::project(self.camera.center, self.camera.zoom);
        let center = cluster::unproject(x - dx, y - dy, self.camera.zoom);
        if center.is_valid() {
            self.camera.center = center;
        }
    }

    /// Every flight requested so far, oldest first
    pub fn flights(&self) -> &[CameraTarget] {
        &self.flights
    }

    pub fn last_flight(&self) -> Option<&CameraTarget> {
        self.flights.last()
    }

    pub fn image(&self, id: &str) -> Option<&MarkerIcon> {
        self.images.get(id)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn source_data(&self, id: &str) -> Option<&FeatureCollection> {
        self.sources.get(id).map(|s| &s.data)
    }

    /// Clusters and markers of `source` at the current zoom
    pub fn rendered_features(&self, source: &str) -> Vec<RenderedFeature> {
        let Some(src) = self.sources.get(source) else {
            return Vec::new();
        };
        src.index
            .clusters(self.camera.zoom)
            .iter()
            .map(|node| match node {
                ClusterNode::Cluster(c) => RenderedFeature::Cluster {
                    cluster_id: c.id,
                    point_count: c.point_count(),
                    position: c.position,
                },
                ClusterNode::Point(i) => RenderedFeature::Point(src.data.features[*i].clone()),
            })
            .collect()
    }

    /// Screen position of `point` in a viewport of `size` pixels centered on the camera
    pub fn to_screen(&self, point: GeoPoint, size: (f64, f64)) -> (f64, f64) {
        let (cx, cy) = cluster::project(self.camera.center, self.camera.zoom);
        let (x, y) = cluster::project(point, self.camera.zoom);
        (x - cx + size.0 / 2.0, y - cy + size.1 / 2.0)
    }

    /// Topmost feature under a screen position
    pub fn hit_test(&self, source: &str, screen: (f64, f64), size: (f64, f64)) -> Option<ClickedFeature> {
        self.rendered_features(source)
            .into_iter()
            .filter_map(|feature| {
                let (x, y) = self.to_screen(feature.position(), size);
                let distance = ((x - screen.0).powi(2) + (y - screen.1).powi(2)).sqrt();
                (distance <= feature.hit_radius()).then_some((distance, feature))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, feature)| feature.to_clicked())
    }

    /// MapLibre style document for the current widget state
    pub fn style_document(&self) -> Value {
        let sources: serde_json::Map<String, Value> = self
            .sources
            .iter()
            .map(|(id, src)| {
                let options = src.index.options();
                (
                    id.clone(),
                    json!({
                        "type": "geojson",
                        "data": src.data,
                        "cluster": true,
                        "clusterRadius": options.radius,
                        "clusterMaxZoom": options.max_zoom,
                    }),
                )
            })
            .collect();
        let mut images: Vec<&String> = self.images.keys().collect();
        images.sort();

        json!({
            "version": 8,
            "metadata": {
                "resmap:base-style": self.style_url,
                "resmap:images": images,
            },
            "center": [self.camera.center.longitude, self.camera.center.latitude],
            "zoom": self.camera.zoom,
            "sources": sources,
            "layers": self.layers.iter().map(LayerSpec::to_style_json).collect::<Vec<_>>(),
        })
    }
}

impl MapWidget for HeadlessMap {
    fn has_image(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    fn add_image(&mut self, id: &str, icon: MarkerIcon) {
        self.images.insert(id.to_string(), icon);
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_clustered_source(&mut self, id: &str, data: FeatureCollection, options: ClusterOptions) {
        self.sources.insert(id.to_string(), ClusteredSource::new(data, options));
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<(), MapError> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| MapError::SourceMissing(id.to_string()))?;
        *source = ClusteredSource::new(data, source.index.options());
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn add_layer(&mut self, layer: LayerSpec) {
        self.layers.push(layer);
    }

    fn cluster_expansion_zoom(&self, source: &str, cluster_id: u64) -> Result<f64, MapError> {
        let src = self
            .sources
            .get(source)
            .ok_or_else(|| MapError::SourceMissing(source.to_string()))?;
        src.index
            .expansion_zoom(cluster_id)
            .ok_or(MapError::UnknownCluster(cluster_id))
    }

    fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    fn fly_to(&mut self, target: CameraTarget) {
        self.set_camera(target.center, target.zoom);
        self.flights.push(target);
    }
}
